use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::AppError,
    handlers::SuccessResponse,
    middleware::CurrentUser,
    models::role::{
        CreatePermissionRequest, CreateRoleRequest, PermissionResponse, RoleQuery, RoleResponse,
    },
    state::AppState,
    types::RoleId,
};

/// One role when `name` is given, otherwise every role.
pub async fn get_roles(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<RoleQuery>,
) -> Result<Response, AppError> {
    let authz = state.authz();
    let as_user = &current.user.user_id;
    match query.name.as_deref() {
        Some(name) => {
            let role = authz
                .get_role_by_name(as_user, name, query.permissions)
                .await?;
            Ok(Json(role).into_response())
        }
        None => {
            let roles = authz.get_roles_all(as_user, query.permissions).await?;
            Ok(Json(roles).into_response())
        }
    }
}

pub async fn create_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<Json<RoleResponse>, AppError> {
    let role = state
        .authz()
        .create_role(&current.user.user_id, &payload.name)
        .await?;
    Ok(Json(RoleResponse::bare(role)))
}

pub async fn delete_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(role_id): Path<RoleId>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .authz()
        .delete_role(&current.user.user_id, role_id)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn get_role_permissions(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(role_id): Path<RoleId>,
) -> Result<Json<Vec<PermissionResponse>>, AppError> {
    let permissions = state
        .authz()
        .get_role_permissions(&current.user.user_id, role_id)
        .await?;
    Ok(Json(permissions.into_iter().map(Into::into).collect()))
}

pub async fn get_permissions(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<PermissionResponse>>, AppError> {
    let permissions = state
        .authz()
        .get_permissions(&current.user.user_id)
        .await?;
    Ok(Json(permissions.into_iter().map(Into::into).collect()))
}

pub async fn create_permission(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<CreatePermissionRequest>,
) -> Result<Json<PermissionResponse>, AppError> {
    let permission = state
        .authz()
        .create_permission(&current.user.user_id, &payload.name)
        .await?;
    Ok(Json(permission.into()))
}
