use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::{AppError, DenialCode},
    handlers::SuccessResponse,
    middleware::{CurrentUser, SessionHandle},
    models::{
        role::{AssignRolesRequest, PermissionResponse, RoleResponse},
        user::{ChangePasswordRequest, CreateUserRequest, PublicUserResponse, UserResponse},
    },
    services::authz::permissions,
    state::AppState,
    types::UserId,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserRolesQuery {
    #[serde(default)]
    pub permissions: bool,
}

pub async fn create_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users()
        .create_user(&current.user.user_id, payload)
        .await?;
    Ok(Json(UserResponse { user }))
}

pub async fn get_public_user(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<Json<PublicUserResponse>, AppError> {
    let user = state.users().get_user_by_name(&user_name).await?;
    Ok(Json(PublicUserResponse { user: user.into() }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    current: CurrentUser,
    session: SessionHandle,
    Path(user_id): Path<UserId>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .users()
        .delete_user(&current.user.user_id, &user_id)
        .await?;
    if current.user.user_id == user_id {
        session.destroy();
    }
    Ok(Json(SuccessResponse::ok()))
}

pub async fn change_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(user_id): Path<UserId>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .users()
        .change_password(&current.user.user_id, &user_id, payload)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Your own roles, or anyone's with `user.mgmt`.
pub async fn get_user_roles(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(user_id): Path<UserId>,
    Query(query): Query<UserRolesQuery>,
) -> Result<Json<Vec<RoleResponse>>, AppError> {
    let authz = state.authz();
    if current.user.user_id != user_id {
        authz
            .require(&current.user.user_id, permissions::USER_MGMT, DenialCode::UserMgmt)
            .await?;
    }
    Ok(Json(authz.get_roles(&user_id, query.permissions).await?))
}

/// Effective permissions of a user: your own, or anyone's with `user.mgmt`.
pub async fn get_user_permissions(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<PermissionResponse>>, AppError> {
    let authz = state.authz();
    if current.user.user_id != user_id {
        authz
            .require(&current.user.user_id, permissions::USER_MGMT, DenialCode::UserMgmt)
            .await?;
    }
    let user = state.users().get_user_by_id(&user_id).await?;
    let granted = authz.get_user_permissions(&user.user_id).await?;
    Ok(Json(granted.into_iter().map(Into::into).collect()))
}

pub async fn assign_roles(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(user_id): Path<UserId>,
    Json(payload): Json<AssignRolesRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .authz()
        .assign_roles(&current.user.user_id, &user_id, &payload.roles)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn remove_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((user_id, role_name)): Path<(UserId, String)>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .authz()
        .unassign_role(&current.user.user_id, &user_id, &role_name)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}
