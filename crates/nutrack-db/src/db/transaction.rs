//! Database transaction utilities

use nutrack_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by a transaction body
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'a>>;

/// Run `f` inside one transaction.
///
/// Commits when the body returns `Ok`. On `Err` the transaction is rolled back and the
/// body's error is returned unchanged, so callers can rely on none of its writes being
/// visible afterwards.
pub async fn with_transaction<T, F>(pool: &PgPool, f: F) -> Result<T, AppError>
where
    F: for<'a> FnOnce(&'a mut Transaction<'_, Postgres>) -> TxFuture<'a, T>,
{
    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        AppError::Database(e)
    })?;

    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to commit transaction");
                AppError::Database(e)
            })?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(
                    error = %rollback_err,
                    original_error = %e,
                    "Failed to roll back transaction"
                );
            } else {
                tracing::debug!(error = %e, "Transaction rolled back");
            }
            Err(e)
        }
    }
}
