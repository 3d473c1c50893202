//! # Error Types
//!
//! Why a store operation was refused. Every variant here is raised before
//! any record changes, so a caller holding a `CoreError` knows the stores are
//! exactly as they were.
//!
//! ```text
//! ValidationError ──► CoreError ──► (pos) ShopError::Core ──► ApiError
//!   bad input          broken rule:
//!                      unknown id, short stock,
//!                      dangling BOM, material in use
//! ```
//!
//! Callers branch on the variant. Messages are for people.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Entity Kind
// =============================================================================

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Product,
    RawMaterial,
    Purchase,
    Transaction,
    CartItem,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Product => "Product",
            EntityKind::RawMaterial => "Raw material",
            EntityKind::Purchase => "Purchase",
            EntityKind::Transaction => "Transaction",
            EntityKind::CartItem => "Cart item",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant is raised *before* any record is mutated: store operations
/// check first and write second, and the settlement engine validates the whole
/// cart before applying a single decrement.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// A decrement would drive stock below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: 400 × Espresso (18 g beans each)
    ///      │
    ///      ▼
    /// Plan: beans required = 7200 g
    ///      │
    ///      ▼
    /// Validate: beans available = 5000 g
    ///      │
    ///      ▼
    /// InsufficientStock { RawMaterial, "1", requested: 7200, available: 5000 }
    ///      │
    ///      ▼
    /// UI shows: "Insufficient stock for Raw material 1: available 5000, requested 7200"
    /// ```
    #[error("Insufficient stock for {entity} {id}: available {available}, requested {requested}")]
    InsufficientStock {
        entity: EntityKind,
        id: String,
        requested: Decimal,
        available: Decimal,
    },

    /// Checkout was invoked on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A BOM ingredient or purchase item points at a record that does not exist.
    ///
    /// ## When This Occurs
    /// - A product's ingredient references a deleted raw material
    /// - A purchase line names an unknown raw material id
    #[error("{referrer} references unknown {entity} {id}")]
    UnresolvedReference {
        referrer: String,
        entity: EntityKind,
        id: String,
    },

    /// The record cannot be removed while other records reference it.
    #[error("{entity} {id} is still used by {used_by}")]
    InUse {
        entity: EntityKind,
        id: String,
        used_by: String,
    },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity kind and id.
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by create/update operations and payment details before any
/// business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Value is larger than another value allows.
    #[error("{field} ({value}) cannot exceed {limit}")]
    Exceeds {
        field: String,
        value: String,
        limit: String,
    },

    /// A sum or product of valid inputs no longer fits the number type
    /// (a restock past `i64::MAX` units, a decimal total past `Decimal::MAX`).
    #[error("{field} is out of range")]
    OutOfRange { field: String },

    /// Duplicate value (e.g., the same raw material twice in one BOM).
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            entity: EntityKind::RawMaterial,
            id: "1".to_string(),
            requested: dec!(7200),
            available: dec!(5000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Raw material 1: available 5000, requested 7200"
        );
    }

    #[test]
    fn test_field_errors_read_naturally() {
        let missing = ValidationError::Required { field: "supplier".into() };
        let zero_cost = ValidationError::MustBePositive { field: "unitCost".into() };
        assert_eq!(missing.to_string(), "supplier is required");
        assert_eq!(zero_cost.to_string(), "unitCost must be greater than 0");
    }

    #[test]
    fn test_bad_input_is_a_core_error() {
        let err: CoreError = ValidationError::Negative { field: "stock".into() }.into();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Negative { ref field }) if field == "stock"
        ));
    }

    #[test]
    fn test_unresolved_reference_message() {
        let err = CoreError::UnresolvedReference {
            referrer: "Product 7".to_string(),
            entity: EntityKind::RawMaterial,
            id: "99".to_string(),
        };
        assert_eq!(err.to_string(), "Product 7 references unknown Raw material 99");
    }
}
