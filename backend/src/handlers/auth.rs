use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header::SET_COOKIE,
    response::IntoResponse,
    Json,
};

use crate::{
    error::{AppError, ServiceError},
    handlers::SuccessResponse,
    middleware::{CurrentUser, SessionHandle},
    models::user::{LoginQuery, LoginRequest, LoginResponse, RegisterRequest, UserResponse},
    state::AppState,
    utils::cookies::{build_clear_cookie, build_cookie, IDENTITY_COOKIE_NAME},
};

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(payload) = payload.map_err(AppError::from_register_body)?;
    let user = state
        .users()
        .register_user(payload)
        .await
        .map_err(|err| match err {
            ServiceError::Validation(errors) => AppError::RegistrationRejected(errors),
            other => other.into(),
        })?;
    Ok(Json(UserResponse { user }))
}

pub async fn login(
    State(state): State<AppState>,
    session: SessionHandle,
    Query(query): Query<LoginQuery>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(AppError::from_login_body)?;
    let outcome = state
        .auth()
        .login(&payload.user_name, &payload.password, &session, query.with_jwt)
        .await
        .map_err(|err| match err {
            ServiceError::NotFound(_) | ServiceError::InvalidPassword => AppError::AuthFailed,
            other => other.into(),
        })?;

    let identity_cookie = build_cookie(
        IDENTITY_COOKIE_NAME,
        &outcome.user.user_name,
        Duration::from_secs(state.config.session_max_age_secs),
        false,
        state.config.cookie_options(),
    );
    let body = LoginResponse {
        user: outcome.user,
        token: outcome.token,
    };
    Ok(([(SET_COOKIE, identity_cookie)], Json(body)))
}

pub async fn logout(
    State(state): State<AppState>,
    session: SessionHandle,
    current: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth()
        .logout_user(&current.user.user_id, &session)
        .await?;
    let cleared = build_clear_cookie(IDENTITY_COOKIE_NAME, false, state.config.cookie_options());
    Ok(([(SET_COOKIE, cleared)], Json(SuccessResponse::ok())))
}

pub async fn whoami(current: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse { user: current.user })
}
