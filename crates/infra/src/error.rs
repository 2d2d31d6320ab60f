//! Storage-layer error model.

use chrono::NaiveDate;
use thiserror::Error;

/// Store operation error.
///
/// These are **infrastructure errors** (storage, concurrency, uniqueness) as
/// opposed to domain errors (validation, invariants). The capacity variants
/// carry the offending date so multi-day failures stay diagnosable.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No inventory row exists for this day. Distinct from sold out: the
    /// product was never configured here.
    #[error("no inventory configured for {0}")]
    NotConfigured(NaiveDate),

    /// The row exists but cannot absorb the requested quantity.
    #[error("insufficient capacity on {0}")]
    InsufficientCapacity(NaiveDate),

    /// The row exists but was manually taken off sale.
    #[error("inventory closed on {0}")]
    Closed(NaiveDate),

    /// Lost a concurrent atomic update (e.g. serialization failure).
    /// Transient; callers apply a bounded retry.
    #[error("concurrent update conflict: {0}")]
    RaceLost(String),

    /// A booking with this reference already exists.
    #[error("duplicate booking reference: {0}")]
    DuplicateReference(String),

    /// Anything else the backend reports (connectivity, corrupt rows, ...).
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Map SQLx errors to StoreError.
///
/// 40001 (serialization_failure) and 40P01 (deadlock_detected) are the
/// transient lost-race class; unique violations are classified by the call
/// site via [`is_unique_violation`].
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                Some("40001") | Some("40P01") => StoreError::RaceLost(msg),
                _ => StoreError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Storage(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Check if an error is a unique constraint violation (PostgreSQL 23505).
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}
