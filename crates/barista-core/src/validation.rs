//! # Validation Module
//!
//! Input validation for create/update operations, purchases and payments.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: POS screen forms                                             │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called by the stores)                           │
//! │  ├── Field rules (price > 0, stock ≥ 0, ...)                           │
//! │  └── BOM shape (positive amounts, no duplicates)                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Stores / settlement                                          │
//! │  ├── Reference resolution (BOM → raw material)                         │
//! │  └── Stock invariants (never below zero)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use barista_core::validation::{validate_name, validate_quantity};
//!
//! validate_name("name", "Espresso").unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Ingredient, NewProduct, NewRawMaterial, Product, RawMaterial};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of names, categories, suppliers.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required, bounded text field (name, unit, category, supplier).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a search query and returns it trimmed and lowercased.
pub fn normalize_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_lowercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::Exceeds {
            field: "quantity".to_string(),
            value: qty.to_string(),
            limit: MAX_ITEM_QUANTITY.to_string(),
        });
    }

    Ok(())
}

/// Rejects zero and negative money (prices, unit costs).
pub fn validate_positive_money(field: &str, value: Money) -> ValidationResult<()> {
    if !value.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Rejects negative money (cost price, discount, tax).
pub fn validate_non_negative_money(field: &str, value: Money) -> ValidationResult<()> {
    if value.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Rejects zero and negative decimal quantities (BOM amounts, purchase quantities).
pub fn validate_positive_amount(field: &str, value: Decimal) -> ValidationResult<()> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Rejects negative stock levels.
pub fn validate_stock_level(field: &str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Checked Arithmetic
// =============================================================================

fn out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
    }
}

/// `a + b` on unit counts (product stock, planned quantities).
pub fn checked_units(field: &str, a: i64, b: i64) -> ValidationResult<i64> {
    a.checked_add(b).ok_or_else(|| out_of_range(field))
}

/// `a + b` on material amounts.
pub fn checked_sum(field: &str, a: Decimal, b: Decimal) -> ValidationResult<Decimal> {
    a.checked_add(b).ok_or_else(|| out_of_range(field))
}

/// `a × b` on material amounts.
pub fn checked_product(field: &str, a: Decimal, b: Decimal) -> ValidationResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| out_of_range(field))
}

/// `a + b` on money.
pub fn checked_money(field: &str, a: Money, b: Money) -> ValidationResult<Money> {
    a.checked_add(b).ok_or_else(|| out_of_range(field))
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a bill of materials.
///
/// ## Rules
/// - Every amount is > 0
/// - A raw material appears at most once
///
/// Whether the ids resolve is checked by the caller that owns the material
/// store.
pub fn validate_ingredients(ingredients: &[Ingredient]) -> ValidationResult<()> {
    let mut seen = HashSet::new();
    for ingredient in ingredients {
        validate_name("ingredient rawMaterialId", &ingredient.raw_material_id)?;
        validate_positive_amount("ingredient amount", ingredient.amount)?;
        if !seen.insert(ingredient.raw_material_id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "ingredient rawMaterialId".to_string(),
                value: ingredient.raw_material_id.clone(),
            });
        }
    }
    Ok(())
}

/// Validates the fields of a new product.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_name("name", &product.name)?;
    validate_positive_money("price", product.price)?;
    validate_non_negative_money("costPrice", product.cost_price)?;
    validate_stock_level("stock", Decimal::from(product.stock))?;
    validate_name("category", &product.category)?;
    validate_ingredients(&product.ingredients)
}

/// Validates a product after a patch has been merged.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_name("name", &product.name)?;
    validate_positive_money("price", product.price)?;
    validate_non_negative_money("costPrice", product.cost_price)?;
    validate_stock_level("stock", Decimal::from(product.stock))?;
    validate_name("category", &product.category)?;
    validate_ingredients(&product.ingredients)
}

/// Validates the fields of a new raw material.
pub fn validate_new_raw_material(material: &NewRawMaterial) -> ValidationResult<()> {
    validate_name("name", &material.name)?;
    validate_name("unit", &material.unit)?;
    validate_stock_level("stock", material.stock)?;
    validate_positive_money("unitCost", material.unit_cost)?;
    validate_name("supplier", &material.supplier)
}

/// Validates a raw material after a patch has been merged.
pub fn validate_raw_material(material: &RawMaterial) -> ValidationResult<()> {
    validate_name("name", &material.name)?;
    validate_name("unit", &material.unit)?;
    validate_stock_level("stock", material.stock)?;
    validate_positive_money("unitCost", material.unit_cost)?;
    validate_name("supplier", &material.supplier)
}

// =============================================================================
// Unit Tests
// =============================================================================
