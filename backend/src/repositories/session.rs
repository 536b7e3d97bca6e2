use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgExecutor};

use crate::models::{Session, SessionData};

/// Returns the session unless it has expired.
pub async fn find_session<'e, E: PgExecutor<'e>>(
    executor: E,
    sid: &str,
) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>(
        r#"
        SELECT sid, sesh, expire, ip_addr, user_agent, user_id, created_at, modified_at
        FROM session
        WHERE sid = $1 AND expire >= NOW()
        "#,
    )
    .bind(sid)
    .fetch_optional(executor)
    .await
}

/// Insert-or-update keyed by `sid`. Network details are only written on
/// insert; later saves refresh the payload, expiry and owner.
pub async fn upsert_session<'e, E: PgExecutor<'e>>(
    executor: E,
    sid: &str,
    data: &SessionData,
    expire: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO session (sid, sesh, expire, ip_addr, user_agent, user_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (sid) DO UPDATE
        SET sesh = EXCLUDED.sesh,
            expire = EXCLUDED.expire,
            user_id = EXCLUDED.user_id,
            modified_at = NOW()
        "#,
    )
    .bind(sid)
    .bind(Json(data))
    .bind(expire)
    .bind(data.ip.as_deref())
    .bind(data.user_agent.as_deref())
    .bind(data.user_id.as_ref())
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn delete_session<'e, E: PgExecutor<'e>>(
    executor: E,
    sid: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM session WHERE sid = $1")
        .bind(sid)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_expired_sessions<'e, E: PgExecutor<'e>>(
    executor: E,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM session WHERE expire < NOW()")
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
