//! Server-side session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

use crate::types::UserId;
use crate::utils::cookies::SameSite;

/// Cookie attributes as they were issued to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieData {
    pub original_max_age: u64,
    pub expires: DateTime<Utc>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
}

/// Payload persisted in `session.sesh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub cookie: CookieData,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub sid: String,
    pub sesh: Json<SessionData>,
    pub expire: DateTime<Utc>,
    pub ip_addr: Option<String>,
    pub user_agent: Option<String>,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}
