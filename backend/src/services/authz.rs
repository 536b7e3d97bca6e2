//! Role based access control.
//!
//! A user's permissions are the union of the permissions of every role
//! assigned to them. Nothing is cached; every check reads the database.
//! Guarded operations re-check the caller first and fail with their own
//! [`DenialCode`].

use std::collections::BTreeMap;

use crate::{
    db::connection::DbPool,
    error::{DenialCode, ServiceError, ServiceResult},
    models::{role::RoleResponse, Permission, Role},
    repositories::{
        begin_transaction, commit_transaction, rbac as rbac_repo, rollback_transaction,
        user as user_repo,
    },
    types::{RoleId, UserId},
};

pub mod permissions {
    pub const USER_CREATE: &str = "user.create";
    pub const USER_MGMT: &str = "user.mgmt";
    pub const ROLE_CREATE: &str = "role.create";
    pub const ROLE_DELETE: &str = "role.delete";
    pub const ROLE_READ: &str = "role.read";
    pub const PERMISSION_READ: &str = "permission.read";
    pub const PERMISSION_CREATE: &str = "permission.create";

    /// Everything granted to the server administrator role.
    pub const ALL: [&str; 7] = [
        USER_CREATE,
        USER_MGMT,
        ROLE_CREATE,
        ROLE_DELETE,
        ROLE_READ,
        PERMISSION_READ,
        PERMISSION_CREATE,
    ];
}

#[derive(Clone)]
pub struct AuthzService {
    pool: DbPool,
}

impl AuthzService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn check_permission(&self, user_id: &UserId, permission: &str) -> ServiceResult<bool> {
        Ok(rbac_repo::user_has_permission(&self.pool, user_id, permission).await?)
    }

    /// Fails with `PermissionDenied` unless the user holds `permission`.
    pub async fn require(
        &self,
        user_id: &UserId,
        permission: &'static str,
        code: DenialCode,
    ) -> ServiceResult<()> {
        if self.check_permission(user_id, permission).await? {
            Ok(())
        } else {
            Err(ServiceError::denied(code, permission))
        }
    }

    pub async fn get_user_permissions(&self, user_id: &UserId) -> ServiceResult<Vec<Permission>> {
        Ok(rbac_repo::find_user_permissions(&self.pool, user_id).await?)
    }

    pub async fn get_role_permissions(
        &self,
        as_user: &UserId,
        role_id: RoleId,
    ) -> ServiceResult<Vec<Permission>> {
        self.require(as_user, permissions::ROLE_READ, DenialCode::RoleRead)
            .await?;
        if rbac_repo::find_role_by_id(&self.pool, role_id).await?.is_none() {
            return Err(ServiceError::NotFound("role"));
        }
        Ok(rbac_repo::find_role_permissions(&self.pool, role_id).await?)
    }

    /// Roles held by the user. With `with_permissions` each role's
    /// permissions are loaded by a separate query.
    pub async fn get_roles(
        &self,
        user_id: &UserId,
        with_permissions: bool,
    ) -> ServiceResult<Vec<RoleResponse>> {
        let roles = rbac_repo::find_user_roles(&self.pool, user_id).await?;
        if !with_permissions {
            return Ok(roles.into_iter().map(RoleResponse::bare).collect());
        }

        let mut responses = Vec::with_capacity(roles.len());
        for role in roles {
            let permissions = rbac_repo::find_role_permissions(&self.pool, role.role_id).await?;
            responses.push(RoleResponse::with_permissions(role, permissions));
        }
        Ok(responses)
    }

    pub async fn get_role_by_name(
        &self,
        as_user: &UserId,
        role_name: &str,
        with_permissions: bool,
    ) -> ServiceResult<RoleResponse> {
        self.require(as_user, permissions::ROLE_READ, DenialCode::RoleRead)
            .await?;
        let role = rbac_repo::find_role_by_name(&self.pool, role_name)
            .await?
            .ok_or(ServiceError::NotFound("role"))?;
        if with_permissions {
            let permissions = rbac_repo::find_role_permissions(&self.pool, role.role_id).await?;
            Ok(RoleResponse::with_permissions(role, permissions))
        } else {
            Ok(RoleResponse::bare(role))
        }
    }

    /// All roles, loaded with one joined query.
    pub async fn get_roles_all(
        &self,
        as_user: &UserId,
        with_permissions: bool,
    ) -> ServiceResult<Vec<RoleResponse>> {
        self.require(as_user, permissions::ROLE_READ, DenialCode::RoleRead)
            .await?;
        let rows = rbac_repo::list_roles_with_permissions(&self.pool).await?;

        let mut grouped: BTreeMap<String, (Role, Vec<Permission>)> = BTreeMap::new();
        for row in rows {
            let entry = grouped
                .entry(row.role.role_name.clone())
                .or_insert_with(|| (row.role.clone(), Vec::new()));
            if let (Some(id), Some(name), Some(created_at), Some(modified_at)) = (
                row.permission_id,
                row.permission_name,
                row.permission_created_at,
                row.permission_modified_at,
            ) {
                entry.1.push(Permission {
                    permission_id: id,
                    permission_name: name,
                    created_at,
                    modified_at,
                });
            }
        }

        Ok(grouped
            .into_values()
            .map(|(role, permissions)| {
                if with_permissions {
                    RoleResponse::with_permissions(role, permissions)
                } else {
                    RoleResponse::bare(role)
                }
            })
            .collect())
    }

    /// Returns the existing role when the name is taken.
    pub async fn create_role(&self, as_user: &UserId, role_name: &str) -> ServiceResult<Role> {
        self.require(as_user, permissions::ROLE_CREATE, DenialCode::RoleCreate)
            .await?;
        self.find_or_create_role(role_name).await
    }

    pub(crate) async fn find_or_create_role(&self, role_name: &str) -> ServiceResult<Role> {
        let role_name = role_name.trim();
        if role_name.is_empty() {
            return Err(ServiceError::validation("name: role name must not be empty"));
        }
        if let Some(role) = rbac_repo::insert_role(&self.pool, role_name).await? {
            tracing::info!(role_id = %role.role_id, role_name, "role created");
            return Ok(role);
        }
        rbac_repo::find_role_by_name(&self.pool, role_name)
            .await?
            .ok_or(ServiceError::NotFound("role"))
    }

    pub async fn delete_role(&self, as_user: &UserId, role_id: RoleId) -> ServiceResult<()> {
        self.require(as_user, permissions::ROLE_DELETE, DenialCode::RoleDelete)
            .await?;
        if !rbac_repo::delete_role(&self.pool, role_id).await? {
            return Err(ServiceError::NotFound("role"));
        }
        tracing::info!(role_id = %role_id, "role deleted");
        Ok(())
    }

    /// Unguarded; callers authorise first.
    pub async fn add_role_to_user(&self, user_id: &UserId, role_name: &str) -> ServiceResult<()> {
        let role = rbac_repo::find_role_by_name(&self.pool, role_name)
            .await?
            .ok_or(ServiceError::NotFound("role"))?;
        rbac_repo::assign_role(&self.pool, user_id, role.role_id).await?;
        Ok(())
    }

    /// Unguarded; callers authorise first.
    pub async fn remove_role_from_user(&self, user_id: &UserId, role_name: &str) -> ServiceResult<()> {
        let role = rbac_repo::find_role_by_name(&self.pool, role_name)
            .await?
            .ok_or(ServiceError::NotFound("role"))?;
        rbac_repo::unassign_role(&self.pool, user_id, role.role_id).await?;
        Ok(())
    }

    /// Assigns every named role, all or nothing.
    pub async fn assign_roles(
        &self,
        as_user: &UserId,
        user_id: &UserId,
        role_names: &[String],
    ) -> ServiceResult<()> {
        self.require(as_user, permissions::USER_MGMT, DenialCode::UserMgmt)
            .await?;
        if user_repo::find_user_by_id(&self.pool, user_id).await?.is_none() {
            return Err(ServiceError::NotFound("user"));
        }

        let mut tx = begin_transaction(&self.pool).await?;
        for role_name in role_names {
            let Some(role) = rbac_repo::find_role_by_name(&mut *tx, role_name).await? else {
                rollback_transaction(tx).await?;
                return Err(ServiceError::NotFound("role"));
            };
            rbac_repo::assign_role(&mut *tx, user_id, role.role_id).await?;
        }
        commit_transaction(tx).await?;
        tracing::info!(user_id = %user_id, roles = ?role_names, "roles assigned");
        Ok(())
    }

    pub async fn unassign_role(
        &self,
        as_user: &UserId,
        user_id: &UserId,
        role_name: &str,
    ) -> ServiceResult<()> {
        self.require(as_user, permissions::USER_MGMT, DenialCode::UserMgmt)
            .await?;
        self.remove_role_from_user(user_id, role_name).await?;
        tracing::info!(user_id = %user_id, role_name, "role removed");
        Ok(())
    }

    pub async fn get_permissions(&self, as_user: &UserId) -> ServiceResult<Vec<Permission>> {
        self.require(as_user, permissions::PERMISSION_READ, DenialCode::PermissionRead)
            .await?;
        Ok(rbac_repo::list_permissions(&self.pool).await?)
    }

    /// Idempotent by name.
    pub async fn create_permission(
        &self,
        as_user: &UserId,
        permission_name: &str,
    ) -> ServiceResult<Permission> {
        self.require(
            as_user,
            permissions::PERMISSION_CREATE,
            DenialCode::PermissionCreate,
        )
        .await?;
        let permission_name = permission_name.trim();
        if permission_name.is_empty() {
            return Err(ServiceError::validation(
                "name: permission name must not be empty",
            ));
        }
        if let Some(permission) = rbac_repo::insert_permission(&self.pool, permission_name).await? {
            return Ok(permission);
        }
        rbac_repo::find_permission_by_name(&self.pool, permission_name)
            .await?
            .ok_or(ServiceError::NotFound("permission"))
    }

    /// Finds or creates the permission and attaches it to an existing role
    /// in one transaction.
    pub async fn create_permission_with_role(
        &self,
        role_name: &str,
        permission_name: &str,
    ) -> ServiceResult<Permission> {
        let mut tx = begin_transaction(&self.pool).await?;

        let permission = match rbac_repo::insert_permission(&mut *tx, permission_name).await? {
            Some(permission) => permission,
            None => match rbac_repo::find_permission_by_name(&mut *tx, permission_name).await? {
                Some(permission) => permission,
                None => {
                    rollback_transaction(tx).await?;
                    return Err(ServiceError::NotFound("permission"));
                }
            },
        };

        let Some(role) = rbac_repo::find_role_by_name(&mut *tx, role_name).await? else {
            rollback_transaction(tx).await?;
            return Err(ServiceError::NotFound("role"));
        };

        rbac_repo::attach_permission_to_role(&mut *tx, role.role_id, permission.permission_id)
            .await?;
        commit_transaction(tx).await?;
        Ok(permission)
    }
}
