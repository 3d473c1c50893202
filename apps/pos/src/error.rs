//! # Error Types
//!
//! `ShopError` for the shop state, `ApiError` for command callers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Barista POS                            │
//! │                                                                         │
//! │  ValidationError ──► CoreError ─────────┐                               │
//! │                                          ▼                              │
//! │                      DbError ──────► ShopError ──────► ApiError         │
//! │                                          │              {code, message} │
//! │                                          │                              │
//! │  ShopError::Core     nothing changed, fix the input and retry           │
//! │  ShopError::Storage  nothing changed, storage is unavailable            │
//! │  ShopError::Unsaved  the change IS applied in memory, the save failed   │
//! │                      ──► RECONCILIATION_REQUIRED, flush() later         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use barista_core::{CoreError, EntityKind, Product, Purchase, RawMaterial, Transaction};
use barista_db::DbError;
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Shop Error
// =============================================================================

/// A change applied in memory, carried by [`ShopError::Unsaved`].
#[derive(Debug, Clone, PartialEq)]
pub enum Committed {
    Sale(Box<Transaction>),
    Purchase(Box<Purchase>),
    Product(Box<Product>),
    RawMaterial(Box<RawMaterial>),
}

impl fmt::Display for Committed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Committed::Sale(t) => write!(f, "Transaction {}", t.id),
            Committed::Purchase(p) => write!(f, "Purchase {}", p.id),
            Committed::Product(p) => write!(f, "Product {}", p.id),
            Committed::RawMaterial(m) => write!(f, "Raw material {}", m.id),
        }
    }
}

impl From<Transaction> for Committed {
    fn from(t: Transaction) -> Self {
        Committed::Sale(Box::new(t))
    }
}

impl From<Purchase> for Committed {
    fn from(p: Purchase) -> Self {
        Committed::Purchase(Box::new(p))
    }
}

impl From<Product> for Committed {
    fn from(p: Product) -> Self {
        Committed::Product(Box::new(p))
    }
}

impl From<RawMaterial> for Committed {
    fn from(m: RawMaterial) -> Self {
        Committed::RawMaterial(Box::new(m))
    }
}

#[derive(Debug, Error)]
pub enum ShopError {
    /// Rejected by the business rules. Nothing was changed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failed before anything was changed.
    #[error(transparent)]
    Storage(#[from] DbError),

    /// The change is live in memory but could not be saved.
    ///
    /// The shop stays dirty; a later [`crate::state::Shop::flush`] writes it.
    #[error("{committed} was applied but not saved after {attempts} attempt(s): {source}")]
    Unsaved {
        committed: Committed,
        attempts: u32,
        source: DbError,
    },
}

impl ShopError {
    /// True when the store state was changed despite the error.
    pub fn mutated(&self) -> bool {
        matches!(self, ShopError::Unsaved { .. })
    }

    /// The settled transaction of an unsaved checkout.
    pub fn committed_transaction(&self) -> Option<&Transaction> {
        match self {
            ShopError::Unsaved {
                committed: Committed::Sale(t),
                ..
            } => Some(t),
            _ => None,
        }
    }
}

pub type ShopResult<T> = Result<T, ShopError>;

// =============================================================================
// API Error
// =============================================================================

/// Error returned from command functions.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Raw material 1: available 5000, requested 7200"
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed, nothing changed
    DatabaseError,

    /// Rejected by a business rule (dangling or in-use references)
    BusinessLogic,

    /// Internal error
    Internal,

    /// Cart operation failed
    CartError,

    /// Product or raw material stock too low
    InsufficientStock,

    /// Change applied but not saved; flush before trusting stored data
    ReconciliationRequired,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::NotFound {
                entity: EntityKind::CartItem,
                ..
            } => ErrorCode::CartError,
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::EmptyCart | CoreError::CartTooLarge { .. } => ErrorCode::CartError,
            CoreError::UnresolvedReference { .. } | CoreError::InUse { .. } => {
                ErrorCode::BusinessLogic
            }
            CoreError::QuantityTooLarge { .. } | CoreError::Validation(_) => {
                ErrorCode::ValidationError
            }
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        // Log the actual error but return a generic message
        tracing::error!(error = %err, "Database operation failed");
        let message = match err {
            DbError::ConnectionFailed(_) => "Database connection failed",
            DbError::MigrationFailed(_) => "Database migration failed",
            DbError::Busy(_) => "Database is busy, try again",
            DbError::TransactionFailed(_) => "Database transaction failed",
            DbError::PoolExhausted => "Database pool exhausted",
            DbError::Serialization { .. } => "Stored data could not be read",
            DbError::QueryFailed(_) | DbError::Internal(_) => "Database operation failed",
        };
        ApiError::new(ErrorCode::DatabaseError, message)
    }
}

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        match err {
            ShopError::Core(e) => e.into(),
            ShopError::Storage(e) => e.into(),
            unsaved @ ShopError::Unsaved { .. } => {
                tracing::error!(error = %unsaved, "Change needs reconciliation");
                ApiError::new(ErrorCode::ReconciliationRequired, unsaved.to_string())
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use barista_core::ValidationError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_core_error_codes() {
        let stock = ApiError::from(CoreError::InsufficientStock {
            entity: EntityKind::RawMaterial,
            id: "1".to_string(),
            requested: dec!(7200),
            available: dec!(5000),
        });
        assert_eq!(stock.code, ErrorCode::InsufficientStock);
        assert!(stock.message.contains("7200"));

        assert_eq!(ApiError::from(CoreError::EmptyCart).code, ErrorCode::CartError);
        assert_eq!(
            ApiError::from(CoreError::not_found(EntityKind::Product, "9")).code,
            ErrorCode::NotFound
        );
        assert_eq!(
            ApiError::from(CoreError::Validation(ValidationError::Required {
                field: "name".to_string()
            }))
            .code,
            ErrorCode::ValidationError
        );
    }

    #[test]
    fn test_db_error_message_is_generic() {
        let err = ApiError::from(DbError::QueryFailed("disk I/O error at page 7".to_string()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("page 7"));
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::new(ErrorCode::ReconciliationRequired, "later");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"RECONCILIATION_REQUIRED","message":"later"}"#);
    }

    #[test]
    fn test_only_unsaved_is_mutated() {
        assert!(!ShopError::Core(CoreError::EmptyCart).mutated());
        assert!(!ShopError::Storage(DbError::PoolExhausted).mutated());
    }
}
