//! Roles, permissions and the two join tables that connect them to users.

use sqlx::PgExecutor;

use crate::models::{Permission, Role};
use crate::types::{PermissionId, RoleId, UserId};

const ROLE_COLUMNS: &str = "role_id, role_name, created_at, modified_at";
const PERMISSION_COLUMNS: &str = "permission_id, permission_name, created_at, modified_at";

/// Joined row used to build roles with their permissions in one query.
#[derive(Debug, sqlx::FromRow)]
pub struct RolePermissionRow {
    #[sqlx(flatten)]
    pub role: Role,
    pub permission_id: Option<PermissionId>,
    pub permission_name: Option<String>,
    pub permission_created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub permission_modified_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub async fn user_has_permission<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
    permission: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM users_user_role uur
            JOIN role_permission rp ON rp.role_id = uur.role_id
            JOIN permission p ON p.permission_id = rp.permission_id
            WHERE uur.user_id = $1 AND p.permission_name = $2
        )
        "#,
    )
    .bind(user_id)
    .bind(permission)
    .fetch_one(executor)
    .await
}

pub async fn find_user_permissions<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
) -> Result<Vec<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(
        r#"
        SELECT DISTINCT p.permission_id, p.permission_name, p.created_at, p.modified_at
        FROM users_user_role uur
        JOIN role_permission rp ON rp.role_id = uur.role_id
        JOIN permission p ON p.permission_id = rp.permission_id
        WHERE uur.user_id = $1
        ORDER BY p.permission_name
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn find_user_roles<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
) -> Result<Vec<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        r#"
        SELECT r.role_id, r.role_name, r.created_at, r.modified_at
        FROM users_user_role uur
        JOIN user_role r ON r.role_id = uur.role_id
        WHERE uur.user_id = $1
        ORDER BY r.role_name
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn find_role_permissions<'e, E: PgExecutor<'e>>(
    executor: E,
    role_id: RoleId,
) -> Result<Vec<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(
        r#"
        SELECT p.permission_id, p.permission_name, p.created_at, p.modified_at
        FROM role_permission rp
        JOIN permission p ON p.permission_id = rp.permission_id
        WHERE rp.role_id = $1
        ORDER BY p.permission_name
        "#,
    )
    .bind(role_id)
    .fetch_all(executor)
    .await
}

pub async fn find_role_by_name<'e, E: PgExecutor<'e>>(
    executor: E,
    role_name: &str,
) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(&format!(
        "SELECT {} FROM user_role WHERE role_name = $1",
        ROLE_COLUMNS
    ))
    .bind(role_name)
    .fetch_optional(executor)
    .await
}

pub async fn find_role_by_id<'e, E: PgExecutor<'e>>(
    executor: E,
    role_id: RoleId,
) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(&format!(
        "SELECT {} FROM user_role WHERE role_id = $1",
        ROLE_COLUMNS
    ))
    .bind(role_id)
    .fetch_optional(executor)
    .await
}

/// Every role with its permissions; roles without permissions yield a single
/// row with null permission columns.
pub async fn list_roles_with_permissions<'e, E: PgExecutor<'e>>(
    executor: E,
) -> Result<Vec<RolePermissionRow>, sqlx::Error> {
    sqlx::query_as::<_, RolePermissionRow>(
        r#"
        SELECT r.role_id, r.role_name, r.created_at, r.modified_at,
               p.permission_id, p.permission_name,
               p.created_at AS permission_created_at,
               p.modified_at AS permission_modified_at
        FROM user_role r
        LEFT JOIN role_permission rp ON rp.role_id = r.role_id
        LEFT JOIN permission p ON p.permission_id = rp.permission_id
        ORDER BY r.role_name, p.permission_name
        "#,
    )
    .fetch_all(executor)
    .await
}

/// Inserts the role unless the name exists; returns `None` on conflict.
pub async fn insert_role<'e, E: PgExecutor<'e>>(
    executor: E,
    role_name: &str,
) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(&format!(
        r#"
        INSERT INTO user_role (role_name) VALUES ($1)
        ON CONFLICT (role_name) DO NOTHING
        RETURNING {}
        "#,
        ROLE_COLUMNS
    ))
    .bind(role_name)
    .fetch_optional(executor)
    .await
}

pub async fn delete_role<'e, E: PgExecutor<'e>>(
    executor: E,
    role_id: RoleId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_role WHERE role_id = $1")
        .bind(role_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_permissions<'e, E: PgExecutor<'e>>(
    executor: E,
) -> Result<Vec<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {} FROM permission ORDER BY permission_name",
        PERMISSION_COLUMNS
    ))
    .fetch_all(executor)
    .await
}

pub async fn find_permission_by_name<'e, E: PgExecutor<'e>>(
    executor: E,
    permission_name: &str,
) -> Result<Option<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(&format!(
        "SELECT {} FROM permission WHERE permission_name = $1",
        PERMISSION_COLUMNS
    ))
    .bind(permission_name)
    .fetch_optional(executor)
    .await
}

/// Inserts the permission unless the name exists; returns `None` on conflict.
pub async fn insert_permission<'e, E: PgExecutor<'e>>(
    executor: E,
    permission_name: &str,
) -> Result<Option<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(&format!(
        r#"
        INSERT INTO permission (permission_name) VALUES ($1)
        ON CONFLICT (permission_name) DO NOTHING
        RETURNING {}
        "#,
        PERMISSION_COLUMNS
    ))
    .bind(permission_name)
    .fetch_optional(executor)
    .await
}

pub async fn attach_permission_to_role<'e, E: PgExecutor<'e>>(
    executor: E,
    role_id: RoleId,
    permission_id: PermissionId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO role_permission (role_id, permission_id) VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(role_id)
    .bind(permission_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// No-op when the user already holds the role.
pub async fn assign_role<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
    role_id: RoleId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users_user_role (user_id, role_id) VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(role_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn unassign_role<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
    role_id: RoleId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users_user_role WHERE user_id = $1 AND role_id = $2")
        .bind(user_id)
        .bind(role_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
