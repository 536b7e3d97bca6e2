//! Cookie-backed server sessions.
//!
//! Every request gets a [`SessionHandle`]. A brand-new session lives only in
//! memory until something saves it (the login flow does); once persisted,
//! each request refreshes the row and re-issues the cookie so the expiry
//! rolls forward.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};

use crate::{
    error::{AppError, ServiceError},
    models::{CookieData, SessionData},
    state::AppState,
    types::UserId,
    utils::{
        client_ip::ClientInfo,
        cookies::{
            build_clear_cookie, build_cookie, extract_cookie_value, sign_session_id,
            unsign_session_cookie, CookieOptions, COOKIE_PATH,
        },
        id_gen,
    },
};

#[derive(Debug, Default)]
struct SessionState {
    persisted: bool,
    destroyed: bool,
    user_id: Option<UserId>,
}

#[derive(Debug)]
struct SessionInner {
    sid: String,
    client: ClientInfo,
    max_age_secs: u64,
    options: CookieOptions,
    state: Mutex<SessionState>,
}

/// Request-scoped view of the caller's session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

impl SessionHandle {
    pub fn new(sid: String, client: ClientInfo, max_age_secs: u64, options: CookieOptions) -> Self {
        Self::build(sid, client, max_age_secs, options, SessionState::default())
    }

    /// Handle for a session already present in the store.
    pub fn restored(
        sid: String,
        client: ClientInfo,
        max_age_secs: u64,
        options: CookieOptions,
        data: SessionData,
    ) -> Self {
        let state = SessionState {
            persisted: true,
            destroyed: false,
            user_id: data.user_id,
        };
        Self::build(sid, client, max_age_secs, options, state)
    }

    fn build(
        sid: String,
        client: ClientInfo,
        max_age_secs: u64,
        options: CookieOptions,
        state: SessionState,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                sid,
                client,
                max_age_secs,
                options,
                state: Mutex::new(state),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn id(&self) -> &str {
        &self.inner.sid
    }

    pub fn client(&self) -> &ClientInfo {
        &self.inner.client
    }

    pub fn is_persisted(&self) -> bool {
        self.state().persisted
    }

    pub fn is_destroyed(&self) -> bool {
        self.state().destroyed
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.state().user_id.clone()
    }

    /// Records the owner; written on the next save.
    pub fn set_user(&self, user_id: Option<UserId>) {
        self.state().user_id = user_id;
    }

    /// Called once the row exists in the store.
    pub fn mark_persisted(&self) {
        self.state().persisted = true;
    }

    /// Deletes the row and clears the cookie once the handler finishes.
    pub fn destroy(&self) {
        let mut state = self.state();
        state.destroyed = true;
        state.persisted = false;
    }

    /// The record to persist and its expiry, computed from now.
    pub fn snapshot(&self) -> (SessionData, DateTime<Utc>) {
        let expires = Utc::now() + Duration::seconds(self.inner.max_age_secs as i64);
        let data = SessionData {
            cookie: CookieData {
                original_max_age: self.inner.max_age_secs * 1000,
                expires,
                http_only: true,
                secure: self.inner.options.secure,
                same_site: self.inner.options.same_site,
                path: COOKIE_PATH.to_string(),
            },
            ip: self.inner.client.ip.clone(),
            user_agent: self.inner.client.user_agent.clone(),
            user_id: self.user_id(),
        };
        (data, expires)
    }
}

impl<S> FromRequestParts<S> for SessionHandle
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHandle>()
            .cloned()
            .ok_or_else(|| ServiceError::MissingContext.into())
    }
}

fn signed_session_id(request: &Request, cookie_name: &str, secret: &[u8]) -> Option<String> {
    request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| extract_cookie_value(header, cookie_name))
        .and_then(|value| unsign_session_cookie(&value, secret))
}

pub async fn session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let config = state.config.clone();
    let secret = config.session_secret.as_bytes();
    let options = config.cookie_options();
    let max_age = config.session_max_age_secs;
    let client = ClientInfo::from_http(request.headers(), request.extensions());

    let existing = match signed_session_id(&request, &config.session_cookie_name, secret) {
        Some(sid) => state
            .session_store
            .get(&sid)
            .await?
            .map(|data| (sid, data)),
        None => None,
    };

    let handle = match existing {
        Some((sid, data)) => SessionHandle::restored(sid, client, max_age, options, data),
        None => SessionHandle::new(id_gen::session_id(), client, max_age, options),
    };
    request.extensions_mut().insert(handle.clone());

    let mut response = next.run(request).await;

    if handle.is_destroyed() {
        if let Err(err) = state.session_store.destroy(handle.id()).await {
            tracing::error!(error = %err, "failed to destroy session");
        }
        let cookie = build_clear_cookie(&config.session_cookie_name, true, options);
        append_cookie(&mut response, &cookie);
    } else if handle.is_persisted() {
        let (data, expire) = handle.snapshot();
        match state.session_store.set(handle.id(), &data, expire).await {
            Ok(()) => {
                if let Some(value) = sign_session_id(handle.id(), secret) {
                    let cookie = build_cookie(
                        &config.session_cookie_name,
                        &value,
                        std::time::Duration::from_secs(max_age),
                        true,
                        options,
                    );
                    append_cookie(&mut response, &cookie);
                }
            }
            Err(err) => tracing::error!(error = %err, "failed to refresh session"),
        }
    }

    Ok(response)
}

pub(crate) fn append_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(err) => tracing::warn!(error = %err, "dropping unrepresentable cookie"),
    }
}
