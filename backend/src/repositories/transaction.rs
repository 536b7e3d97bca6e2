//! Transaction helpers for multi-statement service operations.

use sqlx::postgres::PgTransaction;
use sqlx::PgPool;

use crate::error::ServiceResult;

/// Checks out a dedicated connection and issues `BEGIN`.
///
/// Dropping the handle without [`commit_transaction`] rolls back, so an early
/// `?` return never leaves partial writes behind.
pub async fn begin_transaction(db: &PgPool) -> ServiceResult<PgTransaction<'static>> {
    Ok(db.begin().await?)
}

pub async fn commit_transaction(tx: PgTransaction<'_>) -> ServiceResult<()> {
    Ok(tx.commit().await?)
}

pub async fn rollback_transaction(tx: PgTransaction<'_>) -> ServiceResult<()> {
    Ok(tx.rollback().await?)
}
