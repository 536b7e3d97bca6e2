//! Credential checks, login/logout bookkeeping and bearer tokens.

use std::sync::Arc;

use chrono::Duration;

use crate::{
    config::Config,
    db::connection::DbPool,
    error::{ServiceError, ServiceResult},
    middleware::session::SessionHandle,
    models::{User, UserLogin},
    repositories::{password as password_repo, user as user_repo, user_login as login_repo},
    services::session_store::SessionStore,
    types::UserId,
    utils::{
        jwt::{self, Audience, JwtPayload},
        password::verify_password_async,
    },
};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub login: UserLogin,
    pub token: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    pool: DbPool,
    config: Arc<Config>,
    store: Arc<dyn SessionStore>,
}

impl AuthService {
    pub fn new(pool: DbPool, config: Arc<Config>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            pool,
            config,
            store,
        }
    }

    /// `NotFound` for an unknown user name, `InvalidPassword` for a wrong or
    /// missing password. Callers must not expose the difference.
    pub async fn check_user_password(&self, user_name: &str, password: &str) -> ServiceResult<User> {
        let Some(user) = user_repo::find_user_by_name(&self.pool, user_name).await? else {
            tracing::info!(reason = "user_not_found", "login rejected");
            return Err(ServiceError::NotFound("user"));
        };

        let Some(stored) = password_repo::find_latest_password(&self.pool, &user.user_id).await?
        else {
            tracing::info!(reason = "missing_password", user_id = %user.user_id, "login rejected");
            return Err(ServiceError::InvalidPassword);
        };

        let matches =
            verify_password_async(stored.password_hash, stored.salt, password.to_string()).await?;
        if !matches {
            tracing::info!(reason = "invalid_password", user_id = %user.user_id, "login rejected");
            return Err(ServiceError::InvalidPassword);
        }

        Ok(user)
    }

    /// Persists the session if this is its first save, then records the
    /// login. An existing active login for the pair is reused.
    pub async fn log_in_user(&self, user: &User, session: &SessionHandle) -> ServiceResult<UserLogin> {
        session.set_user(Some(user.user_id.clone()));

        if self.store.get(session.id()).await?.is_none() {
            let (data, expire) = session.snapshot();
            self.store.set(session.id(), &data, expire).await?;
        }
        session.mark_persisted();

        if let Some(login) =
            login_repo::get_active_login(&self.pool, &user.user_id, session.id()).await?
        {
            tracing::debug!(user_login_id = %login.user_login_id, "reusing active login");
            return Ok(login);
        }

        let mut conn = self.pool.acquire().await?;
        let login = login_repo::insert_login(
            &mut conn,
            &user.user_id,
            session.id(),
            session.client().ip.as_deref(),
        )
        .await?;
        tracing::info!(
            user_id = %user.user_id,
            user_login_id = %login.user_login_id,
            "user logged in"
        );
        Ok(login)
    }

    pub async fn login(
        &self,
        user_name: &str,
        password: &str,
        session: &SessionHandle,
        with_jwt: bool,
    ) -> ServiceResult<LoginOutcome> {
        let user = self.check_user_password(user_name, password).await?;
        let login = self.log_in_user(&user, session).await?;
        let token = if with_jwt {
            Some(self.get_jwt(&user.user_id)?)
        } else {
            None
        };
        Ok(LoginOutcome { user, login, token })
    }

    /// Ends the active login on this session, if any, and detaches the user
    /// from the session so the next save clears its owner.
    pub async fn logout_user(&self, user_id: &UserId, session: &SessionHandle) -> ServiceResult<bool> {
        let ended = login_repo::logout(&self.pool, session.id(), user_id).await?;
        if session.user_id().as_ref() == Some(user_id) {
            session.set_user(None);
        }
        if ended {
            tracing::info!(user_id = %user_id, "user logged out");
        } else {
            tracing::debug!(user_id = %user_id, "logout without an active login");
        }
        Ok(ended)
    }

    pub fn get_jwt(&self, user_id: &UserId) -> ServiceResult<String> {
        let now = jwt::now_secs();
        let payload = JwtPayload {
            iss: Some(self.config.jwt_issuer.clone()),
            aud: Some(Audience::One(self.config.jwt_audience.clone())),
            iat: Some(now),
            exp: Some(now + Duration::hours(self.config.jwt_expiration_hours as i64).num_seconds()),
            user_id: Some(user_id.to_string()),
            ..Default::default()
        };
        jwt::sign(payload, self.config.jwt_secret.as_bytes())
    }

    /// Signature, expiry, not-before, audience and issuer.
    pub fn check_jwt(&self, token: &str) -> ServiceResult<JwtPayload> {
        if !jwt::verify(token, self.config.jwt_secret.as_bytes())? {
            return Err(ServiceError::InvalidToken("bad signature"));
        }
        let payload = jwt::decode(token)?.payload;
        let now = jwt::now_secs();

        match payload.exp {
            Some(exp) if exp > now => {}
            _ => return Err(ServiceError::InvalidToken("expired")),
        }
        if payload.nbf.is_some_and(|nbf| nbf > now) {
            return Err(ServiceError::InvalidToken("not yet valid"));
        }
        let audience_ok = payload
            .aud
            .as_ref()
            .is_some_and(|aud| aud.contains(&self.config.jwt_audience));
        if !audience_ok {
            return Err(ServiceError::InvalidToken("audience mismatch"));
        }
        if payload.iss.as_deref() != Some(self.config.jwt_issuer.as_str()) {
            return Err(ServiceError::InvalidToken("issuer mismatch"));
        }
        Ok(payload)
    }

    /// User named by a valid token's `userId` claim.
    pub async fn user_from_token(&self, token: &str) -> ServiceResult<User> {
        let payload = self.check_jwt(token)?;
        let user_id = payload
            .user_id
            .map(UserId::from)
            .ok_or(ServiceError::InvalidToken("missing userId claim"))?;
        user_repo::find_user_by_id(&self.pool, &user_id)
            .await?
            .ok_or(ServiceError::InvalidToken("unknown user"))
    }

    /// User with an active login on the session, if any.
    pub async fn user_from_session(&self, sid: &str) -> ServiceResult<Option<User>> {
        let Some(user_id) = login_repo::get_active_user_id_by_session(&self.pool, sid).await? else {
            return Ok(None);
        };
        Ok(user_repo::find_user_by_id(&self.pool, &user_id).await?)
    }
}
