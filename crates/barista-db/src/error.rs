//! # Storage Errors
//!
//! What can go wrong between the shop and the SQLite file.
//!
//! ```text
//! sqlx::Error ────────────┐
//! MigrateError ───────────┤
//! serde_json::Error ──────┼──► DbError ──► ShopError::{Storage, Unsaved} ──► ApiError
//! ```
//!
//! [`DbError::is_transient`] separates lock contention and pool pressure,
//! which a retry can outlast, from failures that will repeat on every attempt.

use thiserror::Error;

/// SQLite primary result codes for a file held by another connection.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

#[derive(Debug, Error)]
pub enum DbError {
    /// The store file could not be opened or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Another connection or process holds the lock on the store file.
    #[error("Store is busy: {0}")]
    Busy(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A multi-collection save could not begin or commit. Nothing was written.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A collection could not be encoded, or its stored JSON does not parse.
    ///
    /// ## When This Occurs
    /// - The stored value was edited by hand and no longer parses
    /// - The stored array contains the same id twice
    /// - A stored record breaks a field rule, such as a negative stock
    #[error("Collection '{collection}' could not be (de)serialized: {message}")]
    Serialization { collection: String, message: String },

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn serialization(collection: impl Into<String>, err: impl std::fmt::Display) -> Self {
        DbError::Serialization {
            collection: collection.into(),
            message: err.to_string(),
        }
    }

    /// Maps a failure to begin or commit a save transaction.
    pub fn transaction(err: sqlx::Error) -> Self {
        match DbError::from(err) {
            DbError::QueryFailed(message) | DbError::Internal(message) => {
                DbError::TransactionFailed(message)
            }
            other => other,
        }
    }

    /// Whether the same save may succeed if tried again shortly.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DbError::Busy(_) | DbError::PoolExhausted | DbError::TransactionFailed(_)
        )
    }
}

fn busy_message(err: &sqlx::Error) -> Option<String> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    // Extended codes keep the primary code in the low byte.
    let code = db_err.code()?.parse::<i32>().ok()? & 0xff;
    matches!(code, SQLITE_BUSY | SQLITE_LOCKED).then(|| db_err.message().to_string())
}

/// ## Error Mapping
/// ```text
/// SQLITE_BUSY / SQLITE_LOCKED   → DbError::Busy
/// other database errors         → DbError::QueryFailed
/// PoolTimedOut                  → DbError::PoolExhausted
/// PoolClosed                    → DbError::ConnectionFailed
/// anything else                 → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(message) = busy_message(&err) {
            return DbError::Busy(message);
        }
        match err {
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("store is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
