use std::sync::Arc;

use crate::{
    config::Config,
    db::connection::DbPool,
    services::{
        auth::AuthService,
        authz::AuthzService,
        session_store::{PgSessionStore, SessionStore},
        user::UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub session_store: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let session_store = Arc::new(PgSessionStore::new(pool.clone()));
        Self::with_session_store(pool, config, session_store)
    }

    pub fn with_session_store(
        pool: DbPool,
        config: Config,
        session_store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            session_store,
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(
            self.pool.clone(),
            self.config.clone(),
            self.session_store.clone(),
        )
    }

    pub fn authz(&self) -> AuthzService {
        AuthzService::new(self.pool.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.pool.clone(), self.config.clone())
    }
}
