//! # Domain Types
//!
//! Records owned by the stores and ledgers, plus the input shapes used to
//! create and update them.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐  BOM (by id)  ┌─────────────────┐                  │
//! │  │    Product      │ ────────────► │   RawMaterial   │                  │
//! │  │  price, cost    │  Ingredient   │  stock, unit    │                  │
//! │  │  stock (units)  │  {id, amount} │  unitCost       │                  │
//! │  └─────────────────┘               └─────────────────┘                  │
//! │          │ snapshot                          ▲ restock                  │
//! │          ▼                                   │                          │
//! │  ┌─────────────────┐               ┌─────────────────┐                  │
//! │  │  Transaction    │               │    Purchase     │                  │
//! │  │  items, totals  │               │  items, total   │                  │
//! │  │  (append-only)  │               │  (append-only)  │                  │
//! │  └─────────────────┘               └─────────────────┘                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialized Shape
//! Records serialize with camelCase field names (`rawMaterialId`,
//! `costPrice`, `createdAt`, ...) because they are the persisted format of the
//! four collections and the payloads the POS screen renders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Record Trait
// =============================================================================

/// A record that lives in an id-indexed [`crate::collection::Collection`].
pub trait Record {
    /// Stable identifier of the record.
    fn id(&self) -> &str;

    /// Bumps `updated_at` after a mutation.
    fn touch(&mut self, now: DateTime<Utc>);
}

/// Generates a new record id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Raw Material
// =============================================================================

/// A stocked ingredient (beans, milk, cups...).
///
/// `stock` is measured in `unit` (grams, millilitres, pieces) and may be
/// fractional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterial {
    pub id: String,
    pub name: String,
    pub unit: String,
    #[ts(type = "string")]
    pub stock: Decimal,
    pub unit_cost: Money,
    pub supplier: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl RawMaterial {
    /// Value of the stock on hand at the current unit cost.
    pub fn stock_value(&self) -> Money {
        self.unit_cost.times(self.stock)
    }
}

impl Record for RawMaterial {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Fields supplied when creating a raw material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRawMaterial {
    pub name: String,
    pub unit: String,
    pub stock: Decimal,
    pub unit_cost: Money,
    pub supplier: String,
}

/// Partial update of a raw material. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialPatch {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub stock: Option<Decimal>,
    pub unit_cost: Option<Money>,
    pub supplier: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// One line of a product's bill of materials.
///
/// `raw_material_id` is a non-owning reference resolved through the material
/// store's id index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub raw_material_id: String,
    /// Amount consumed per unit sold, in the material's unit.
    #[ts(type = "string")]
    pub amount: Decimal,
}

impl Ingredient {
    pub fn new(raw_material_id: impl Into<String>, amount: Decimal) -> Self {
        Ingredient {
            raw_material_id: raw_material_id.into(),
            amount,
        }
    }
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Selling price per unit.
    pub price: Money,
    /// Cost of goods per unit (used for profit).
    pub cost_price: Money,
    /// Finished units on hand.
    pub stock: i64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Bill of materials, in display order.
    pub ingredients: Vec<Ingredient>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Margin per unit (price − cost).
    #[inline]
    pub fn unit_margin(&self) -> Money {
        self.price - self.cost_price
    }

    /// Checks if the product has enough finished units for the given quantity.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }

    /// Whether the BOM references the given raw material.
    pub fn uses_material(&self, raw_material_id: &str) -> bool {
        self.ingredients
            .iter()
            .any(|i| i.raw_material_id == raw_material_id)
    }
}

impl Record for Product {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Fields supplied when creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub cost_price: Money,
    pub stock: i64,
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

/// Partial update of a product. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub cost_price: Option<Money>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
}

// =============================================================================
// Purchase
// =============================================================================

/// One received line of a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub raw_material_id: String,
    #[ts(type = "string")]
    pub quantity: Decimal,
    pub unit_cost: Money,
    /// quantity × unit_cost, computed at creation.
    pub total: Money,
}

/// A stock replenishment event. Never edited once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub supplier: String,
    pub items: Vec<PurchaseItem>,
    pub total_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Record for Purchase {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Other,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

/// A sold line, frozen at settlement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub product_id: String,
    /// Denormalized snapshot of the product name.
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub cost_price: Money,
    pub total_price: Money,
    pub profit: Money,
}

/// A completed sale. Never edited once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub items: Vec<TransactionItem>,
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
    pub profit: Money,
    pub payment_method: PaymentMethod,
    pub cashier_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Total number of units sold in this transaction.
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

impl Record for Transaction {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

// =============================================================================
// Operator (Auth collaborator)
// =============================================================================

/// Role of the signed-in operator. Authorization lives outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
}

/// The signed-in operator, as supplied by the auth collaborator.
///
/// Only `display_name` reaches the core: it becomes `Transaction.cashier_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub display_name: String,
    pub role: Role,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn espresso() -> Product {
        let now = Utc::now();
        Product {
            id: "1".to_string(),
            name: "Espresso".to_string(),
            price: Money::from_cents(350),
            cost_price: Money::from_cents(120),
            stock: 100,
            category: "Coffee".to_string(),
            image: None,
            ingredients: vec![Ingredient::new("1", dec!(18)), Ingredient::new("2", dec!(40))],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_product_helpers() {
        let p = espresso();
        assert_eq!(p.unit_margin(), Money::from_cents(230));
        assert!(p.can_sell(100));
        assert!(!p.can_sell(101));
        assert!(p.uses_material("2"));
        assert!(!p.uses_material("3"));
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let json = serde_json::to_value(espresso()).unwrap();
        assert_eq!(json["costPrice"], "1.20");
        assert_eq!(json["ingredients"][0]["rawMaterialId"], "1");
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_payment_method_serialization() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Card).unwrap(), "\"card\"");
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    #[test]
    fn test_raw_material_stock_value() {
        let now = Utc::now();
        let water = RawMaterial {
            id: "2".to_string(),
            name: "Water".to_string(),
            unit: "ml".to_string(),
            stock: dec!(50000),
            unit_cost: Money::new(dec!(0.001)),
            supplier: "Local Water Supply".to_string(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(water.stock_value(), Money::new(dec!(50)));
    }
}
