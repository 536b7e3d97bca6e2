use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::{PasswordId, UserId};

/// One entry in a user's password history; the newest row is authoritative.
#[derive(Debug, Clone, FromRow)]
pub struct Password {
    pub password_id: PasswordId,
    pub password_hash: String,
    pub salt: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}
