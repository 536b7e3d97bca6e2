//! Login ledger: which user authenticated on which session, and whether
//! that login has ended.

use sqlx::{PgConnection, PgExecutor};

use crate::models::UserLogin;
use crate::types::UserId;

const LOGIN_COLUMNS: &str = "user_login_id, sid, user_id, ip_addr, logged_out, logged_out_at, \
                             created_at, modified_at";

pub async fn get_active_login<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: &UserId,
    sid: &str,
) -> Result<Option<UserLogin>, sqlx::Error> {
    sqlx::query_as::<_, UserLogin>(&format!(
        r#"
        SELECT {}
        FROM user_login
        WHERE user_id = $1 AND sid = $2 AND logged_out = FALSE
        ORDER BY created_at DESC, user_login_id DESC
        LIMIT 1
        "#,
        LOGIN_COLUMNS
    ))
    .bind(user_id)
    .bind(sid)
    .fetch_optional(executor)
    .await
}

/// Always attempts the insert. If a concurrent request already holds the
/// active row for the pair, the unique index turns the insert into a no-op
/// and the surviving row is returned instead.
pub async fn insert_login(
    conn: &mut PgConnection,
    user_id: &UserId,
    sid: &str,
    ip_addr: Option<&str>,
) -> Result<UserLogin, sqlx::Error> {
    let inserted = sqlx::query_as::<_, UserLogin>(&format!(
        r#"
        INSERT INTO user_login (sid, user_id, ip_addr)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, sid) WHERE logged_out = FALSE DO NOTHING
        RETURNING {}
        "#,
        LOGIN_COLUMNS
    ))
    .bind(sid)
    .bind(user_id)
    .bind(ip_addr)
    .fetch_optional(&mut *conn)
    .await?;

    match inserted {
        Some(login) => Ok(login),
        None => get_active_login(&mut *conn, user_id, sid)
            .await?
            .ok_or(sqlx::Error::RowNotFound),
    }
}

/// Flags the most recently modified active login for the pair. Returns
/// whether a row was updated; no active login is not an error.
pub async fn logout<'e, E: PgExecutor<'e>>(
    executor: E,
    sid: &str,
    user_id: &UserId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE user_login
        SET logged_out = TRUE,
            logged_out_at = NOW(),
            modified_at = NOW()
        WHERE user_login_id = (
            SELECT user_login_id
            FROM user_login
            WHERE sid = $1 AND user_id = $2 AND logged_out = FALSE
            ORDER BY modified_at DESC, user_login_id DESC
            LIMIT 1
        )
        "#,
    )
    .bind(sid)
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Who is logged in on this session, if anyone.
pub async fn get_active_user_id_by_session<'e, E: PgExecutor<'e>>(
    executor: E,
    sid: &str,
) -> Result<Option<UserId>, sqlx::Error> {
    sqlx::query_scalar::<_, UserId>(
        r#"
        SELECT u.user_id
        FROM users u
        JOIN user_login ul ON ul.user_id = u.user_id
        JOIN session s ON s.sid = ul.sid
        WHERE s.sid = $1
          AND ul.logged_out = FALSE
          AND s.expire >= NOW()
        ORDER BY ul.created_at DESC, ul.user_login_id DESC
        LIMIT 1
        "#,
    )
    .bind(sid)
    .fetch_optional(executor)
    .await
}
