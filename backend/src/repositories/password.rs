use sqlx::PgExecutor;

use crate::models::Password;
use crate::types::UserId;

const PASSWORD_COLUMNS: &str = "password_id, password_hash, salt, user_id, created_at";

pub async fn insert_password<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
    password_hash: &str,
    salt: &str,
) -> Result<Password, sqlx::Error> {
    sqlx::query_as::<_, Password>(&format!(
        "INSERT INTO password (password_hash, salt, user_id) VALUES ($1, $2, $3) RETURNING {}",
        PASSWORD_COLUMNS
    ))
    .bind(password_hash)
    .bind(salt)
    .bind(user_id)
    .fetch_one(executor)
    .await
}

pub async fn find_latest_password<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
) -> Result<Option<Password>, sqlx::Error> {
    sqlx::query_as::<_, Password>(&format!(
        r#"
        SELECT {}
        FROM password
        WHERE user_id = $1
        ORDER BY created_at DESC, password_id DESC
        LIMIT 1
        "#,
        PASSWORD_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Deletes all but the newest `keep` rows for the user.
pub async fn prune_password_history<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
    keep: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM password
        WHERE user_id = $1
          AND password_id NOT IN (
              SELECT password_id
              FROM password
              WHERE user_id = $1
              ORDER BY created_at DESC, password_id DESC
              LIMIT $2
          )
        "#,
    )
    .bind(user_id)
    .bind(keep)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
