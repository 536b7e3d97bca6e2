use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{
    error::{AppError, ServiceError},
    middleware::session::SessionHandle,
    models::User,
    state::AppState,
};

/// The authenticated caller, placed in request extensions by [`auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ServiceError::MissingContext.into())
    }
}

/// Resolves the caller from a bearer token, falling back to the session's
/// active login. Requests with neither are rejected with 401.
pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .map(str::to_owned);

    let user = match bearer {
        Some(token) => state
            .auth()
            .user_from_token(&token)
            .await
            .map_err(|err| match err {
                ServiceError::InvalidToken(reason) => {
                    tracing::info!(reason, "bearer token rejected");
                    AppError::Unauthorized("Invalid token".to_string())
                }
                other => other.into(),
            })?,
        None => {
            let session = request
                .extensions()
                .get::<SessionHandle>()
                .cloned()
                .ok_or(ServiceError::MissingContext)?;
            state
                .auth()
                .user_from_session(session.id())
                .await?
                .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))?
        }
    };

    tracing::Span::current().record("user_id", tracing::field::display(&user.user_id));
    request.extensions_mut().insert(CurrentUser { user });
    Ok(next.run(request).await)
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}
