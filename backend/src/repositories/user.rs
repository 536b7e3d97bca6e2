use sqlx::PgExecutor;

use crate::models::User;
use crate::types::UserId;

const USER_COLUMNS: &str = "user_id, user_name, email, created_at, modified_at";

pub async fn insert_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
    user_name: &str,
    email: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (user_id, user_name, email) VALUES ($1, $2, $3) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(user_id)
    .bind(user_name)
    .bind(email)
    .fetch_one(executor)
    .await
}

pub async fn find_user_by_id<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

/// Exact, case-sensitive match.
pub async fn find_user_by_name<'e, E: PgExecutor<'e>>(
    executor: E,
    user_name: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE user_name = $1",
        USER_COLUMNS
    ))
    .bind(user_name)
    .fetch_optional(executor)
    .await
}

/// Reports which of the unique identity fields are already in use.
pub async fn find_identity_conflicts<'e, E: PgExecutor<'e>>(
    executor: E,
    user_name: &str,
    email: &str,
) -> Result<(bool, bool), sqlx::Error> {
    let row: (bool, bool) = sqlx::query_as(
        r#"
        SELECT
            EXISTS (SELECT 1 FROM users WHERE user_name = $1),
            EXISTS (SELECT 1 FROM users WHERE email = $2)
        "#,
    )
    .bind(user_name)
    .bind(email)
    .fetch_one(executor)
    .await?;
    Ok(row)
}

/// Cascades to passwords, sessions, logins and role assignments.
pub async fn delete_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn touch_user<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET modified_at = NOW() WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}
