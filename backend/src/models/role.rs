//! Roles, permissions and their wire representations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::types::{PermissionId, RoleId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Role {
    pub role_id: RoleId,
    pub role_name: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Permission {
    pub permission_id: PermissionId,
    pub permission_name: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PermissionResponse {
    pub id: PermissionId,
    pub name: String,
}

impl From<Permission> for PermissionResponse {
    fn from(permission: Permission) -> Self {
        Self {
            id: permission.permission_id,
            name: permission.permission_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoleResponse {
    pub id: RoleId,
    pub name: String,
    /// Present only when permissions were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<PermissionResponse>>,
}

impl RoleResponse {
    pub fn bare(role: Role) -> Self {
        Self {
            id: role.role_id,
            name: role.role_name,
            permissions: None,
        }
    }

    pub fn with_permissions(role: Role, permissions: Vec<Permission>) -> Self {
        Self {
            id: role.role_id,
            name: role.role_name,
            permissions: Some(permissions.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoleQuery {
    /// Return only the role with this name.
    pub name: Option<String>,
    /// Nest each role's permissions.
    #[serde(default)]
    pub permissions: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePermissionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignRolesRequest {
    pub roles: Vec<String>,
}
