//! Startup seeding of system accounts and the administrator role.

use crate::{
    config::{Config, SystemUser},
    db::connection::DbPool,
    error::{ServiceError, ServiceResult},
    models::{user::CreateUserRequest, User},
    services::{
        authz::{permissions, AuthzService},
        user::UserService,
    },
};

pub const SERVER_ADMIN_ROLE: &str = "ServerAdmin";
pub const NO_PERMISSIONS_ROLE: &str = "NoPermissions";

/// Safe to run on every start.
pub async fn bootstrap(pool: &DbPool, config: &Config) -> ServiceResult<()> {
    let authz = AuthzService::new(pool.clone());
    let users = UserService::new(pool.clone(), std::sync::Arc::new(config.clone()));

    authz.find_or_create_role(SERVER_ADMIN_ROLE).await?;
    for permission in permissions::ALL {
        authz
            .create_permission_with_role(SERVER_ADMIN_ROLE, permission)
            .await?;
    }
    authz.find_or_create_role(NO_PERMISSIONS_ROLE).await?;

    if let Some(super_user) = &config.super_user {
        let user = ensure_user(&users, super_user).await?;
        authz.add_role_to_user(&user.user_id, SERVER_ADMIN_ROLE).await?;
        tracing::info!(user_name = %user.user_name, "super user ready");
    } else {
        tracing::warn!("SUPER_USER_* not configured; skipping super user");
    }

    if let Some(api_user) = &config.api_user {
        let user = ensure_user(&users, api_user).await?;
        authz
            .add_role_to_user(&user.user_id, NO_PERMISSIONS_ROLE)
            .await?;
        tracing::info!(user_name = %user.user_name, "api user ready");
    } else {
        tracing::debug!("API_USER_* not configured; skipping api user");
    }

    Ok(())
}

async fn ensure_user(users: &UserService, account: &SystemUser) -> ServiceResult<User> {
    match users.get_user_by_name(&account.username).await {
        Ok(user) => Ok(user),
        Err(ServiceError::NotFound(_)) => {
            users
                .insert_user(CreateUserRequest {
                    user_name: account.username.clone(),
                    email: account.email.clone(),
                    password: account.password.clone(),
                    roles: Vec::new(),
                })
                .await
        }
        Err(err) => Err(err),
    }
}
