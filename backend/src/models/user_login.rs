use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::types::{LoginId, UserId};

/// A user authenticating on a session. Rows are only ever flagged as logged
/// out, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct UserLogin {
    pub user_login_id: LoginId,
    pub sid: Option<String>,
    pub user_id: UserId,
    pub ip_addr: Option<String>,
    pub logged_out: bool,
    pub logged_out_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}
