//! Persistence for server-side sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::connection::DbPool;
use crate::error::ServiceResult;
use crate::models::SessionData;
use crate::repositories::session as session_repo;

/// Backing store driven by the session middleware and the login flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Unexpired sessions only.
    async fn get(&self, sid: &str) -> ServiceResult<Option<SessionData>>;
    async fn set(&self, sid: &str, data: &SessionData, expire: DateTime<Utc>) -> ServiceResult<()>;
    async fn destroy(&self, sid: &str) -> ServiceResult<()>;
}

#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn get(&self, sid: &str) -> ServiceResult<Option<SessionData>> {
        let session = session_repo::find_session(&self.pool, sid).await?;
        Ok(session.map(|row| row.sesh.0))
    }

    async fn set(&self, sid: &str, data: &SessionData, expire: DateTime<Utc>) -> ServiceResult<()> {
        session_repo::upsert_session(&self.pool, sid, data, expire).await?;
        Ok(())
    }

    async fn destroy(&self, sid: &str) -> ServiceResult<()> {
        let removed = session_repo::delete_session(&self.pool, sid).await?;
        tracing::debug!(removed, "session destroyed");
        Ok(())
    }
}
