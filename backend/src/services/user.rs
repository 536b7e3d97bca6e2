//! Account lifecycle: creation, lookup, deletion and password changes.

use std::sync::Arc;

use crate::{
    config::Config,
    db::connection::DbPool,
    error::{DenialCode, ServiceError, ServiceResult},
    models::{
        user::{ChangePasswordRequest, CreateUserRequest, RegisterRequest},
        User,
    },
    repositories::{
        begin_transaction, commit_transaction, password as password_repo, rbac as rbac_repo,
        rollback_transaction, user as user_repo,
    },
    services::authz::{permissions, AuthzService},
    types::UserId,
    utils::password::{generate_salt, hash_password_async, verify_password_async},
    validation::validate_payload,
};

#[derive(Clone)]
pub struct UserService {
    pool: DbPool,
    config: Arc<Config>,
}

impl UserService {
    pub fn new(pool: DbPool, config: Arc<Config>) -> Self {
        Self { pool, config }
    }

    fn authz(&self) -> AuthzService {
        AuthzService::new(self.pool.clone())
    }

    pub async fn register_user(&self, request: RegisterRequest) -> ServiceResult<User> {
        self.insert_user(request.into()).await
    }

    pub async fn create_user(
        &self,
        as_user: &UserId,
        request: CreateUserRequest,
    ) -> ServiceResult<User> {
        self.authz()
            .require(as_user, permissions::USER_CREATE, DenialCode::UserCreate)
            .await?;
        self.insert_user(request).await
    }

    /// Validates, then writes the user, the first password row and any
    /// requested roles in one transaction.
    pub(crate) async fn insert_user(&self, request: CreateUserRequest) -> ServiceResult<User> {
        validate_payload(&request)?;

        let (name_taken, email_taken) =
            user_repo::find_identity_conflicts(&self.pool, &request.user_name, &request.email)
                .await?;
        let mut conflicts = Vec::new();
        if name_taken {
            conflicts.push("user_name: user name already taken".to_string());
        }
        if email_taken {
            conflicts.push("email: email already registered".to_string());
        }
        if !conflicts.is_empty() {
            return Err(ServiceError::Validation(conflicts));
        }

        let salt = generate_salt();
        let hash = hash_password_async(request.password.clone(), salt.clone()).await?;
        let user_id = UserId::generate();

        let mut tx = begin_transaction(&self.pool).await?;
        let user =
            match user_repo::insert_user(&mut *tx, &user_id, &request.user_name, &request.email)
                .await
            {
                Ok(user) => user,
                Err(err) => {
                    rollback_transaction(tx).await?;
                    let err = ServiceError::from(err);
                    // lost a race with a concurrent registration
                    if err.is_unique_violation() {
                        return Err(ServiceError::validation(
                            "user_name: user name or email already taken",
                        ));
                    }
                    return Err(err);
                }
            };
        password_repo::insert_password(&mut *tx, &user.user_id, &hash, &salt).await?;

        for role_name in &request.roles {
            let Some(role) = rbac_repo::find_role_by_name(&mut *tx, role_name).await? else {
                rollback_transaction(tx).await?;
                return Err(ServiceError::NotFound("role"));
            };
            rbac_repo::assign_role(&mut *tx, &user.user_id, role.role_id).await?;
        }
        commit_transaction(tx).await?;

        tracing::info!(user_id = %user.user_id, user_name = %user.user_name, "user created");
        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: &UserId) -> ServiceResult<User> {
        user_repo::find_user_by_id(&self.pool, user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))
    }

    pub async fn get_user_by_name(&self, user_name: &str) -> ServiceResult<User> {
        user_repo::find_user_by_name(&self.pool, user_name)
            .await?
            .ok_or(ServiceError::NotFound("user"))
    }

    pub async fn delete_user(&self, as_user: &UserId, user_id: &UserId) -> ServiceResult<()> {
        self.authz()
            .require(as_user, permissions::USER_MGMT, DenialCode::UserMgmt)
            .await?;
        if !user_repo::delete_user(&self.pool, user_id).await? {
            return Err(ServiceError::NotFound("user"));
        }
        tracing::info!(user_id = %user_id, deleted_by = %as_user, "user deleted");
        Ok(())
    }

    /// Changing your own password needs the current one; changing someone
    /// else's needs `user.mgmt`. Old rows beyond the retention limit are
    /// pruned in the same transaction.
    pub async fn change_password(
        &self,
        as_user: &UserId,
        user_id: &UserId,
        request: ChangePasswordRequest,
    ) -> ServiceResult<()> {
        validate_payload(&request)?;

        if as_user == user_id {
            let current = request
                .password
                .ok_or_else(|| ServiceError::validation("password: current password is required"))?;
            let stored = password_repo::find_latest_password(&self.pool, user_id)
                .await?
                .ok_or(ServiceError::InvalidPassword)?;
            if !verify_password_async(stored.password_hash, stored.salt, current).await? {
                return Err(ServiceError::InvalidPassword);
            }
        } else {
            self.authz()
                .require(as_user, permissions::USER_MGMT, DenialCode::UserMgmt)
                .await?;
            if user_repo::find_user_by_id(&self.pool, user_id).await?.is_none() {
                return Err(ServiceError::NotFound("user"));
            }
        }

        let salt = generate_salt();
        let hash = hash_password_async(request.next_password, salt.clone()).await?;
        let keep = i64::from(self.config.password_history_retention.max(1));

        let mut tx = begin_transaction(&self.pool).await?;
        password_repo::insert_password(&mut *tx, user_id, &hash, &salt).await?;
        let pruned = password_repo::prune_password_history(&mut *tx, user_id, keep).await?;
        user_repo::touch_user(&mut *tx, user_id).await?;
        commit_transaction(tx).await?;

        tracing::info!(user_id = %user_id, changed_by = %as_user, pruned, "password changed");
        Ok(())
    }
}
