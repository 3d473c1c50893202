//! # Settlement Engine
//!
//! Converts a cart into a recorded [`Transaction`], consuming finished
//! product stock and the raw materials behind it.
//!
//! ## Two-Phase Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         checkout()                                      │
//! │                                                                         │
//! │  Cart ──► 1. PLAN      product qty per id, Σ amount × qty per material  │
//! │           │            (reads only; unknown product → NotFound,         │
//! │           │             unknown BOM material → UnresolvedReference)     │
//! │           ▼                                                             │
//! │           2. VALIDATE  every demand against current stock               │
//! │           │            (any shortfall → InsufficientStock, no change)   │
//! │           ▼                                                             │
//! │  ─ ─ ─ ─ ─ ─ ─ nothing has been mutated above this line ─ ─ ─ ─ ─ ─ ─   │
//! │           ▼                                                             │
//! │           3. APPLY     all product and material decrements              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │           4. RECORD    TransactionItems from the cart snapshots,        │
//! │                        totals, append to the ledger                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Materials shared by several cart lines are summed before validation:
//! two Espressos and a Latte need 54 g of beans, checked once.
//!
//! Clearing the cart and persisting the touched collections happen in the
//! application layer once this returns.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::catalog::CatalogStore;
use crate::error::{CoreError, CoreResult, EntityKind, ValidationError};
use crate::ledger::TransactionLedger;
use crate::materials::MaterialStore;
use crate::money::Money;
use crate::types::{generate_id, Operator, PaymentMethod, Transaction, TransactionItem};
use crate::validation::{
    checked_money, checked_product, checked_sum, checked_units, validate_name,
    validate_non_negative_money, ValidationResult,
};

// =============================================================================
// Payment Details
// =============================================================================

/// Everything the cashier supplies at checkout besides the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub tax: Money,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub cashier_name: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PaymentDetails {
    /// Payment with no discount or tax, rung up by `operator`.
    pub fn for_operator(operator: &Operator, payment_method: PaymentMethod) -> Self {
        PaymentDetails {
            discount: Money::zero(),
            tax: Money::zero(),
            payment_method,
            cashier_name: operator.display_name.clone(),
            customer_name: None,
            notes: None,
        }
    }

    /// ## Rules
    /// - discount ≥ 0, tax ≥ 0
    /// - discount ≤ subtotal (a sale never totals below its tax)
    /// - subtotal − discount + tax representable
    /// - cashier name present
    pub fn validate(&self, subtotal: Money) -> ValidationResult<()> {
        validate_non_negative_money("discount", self.discount)?;
        validate_non_negative_money("tax", self.tax)?;
        if self.discount > subtotal {
            return Err(ValidationError::Exceeds {
                field: "discount".to_string(),
                value: self.discount.to_string(),
                limit: subtotal.to_string(),
            });
        }
        checked_money("total", subtotal - self.discount, self.tax)?;
        validate_name("cashierName", &self.cashier_name)
    }
}

// =============================================================================
// Plan
// =============================================================================

/// Finished units required of one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDemand {
    pub product_id: String,
    pub quantity: i64,
}

/// Raw material required across the whole cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialDemand {
    pub raw_material_id: String,
    pub amount: Decimal,
}

/// Aggregated stock demand of a cart, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementPlan {
    pub products: Vec<ProductDemand>,
    pub materials: Vec<MaterialDemand>,
}

impl SettlementPlan {
    /// Total demand for one material, if the cart needs any.
    pub fn material(&self, raw_material_id: &str) -> Option<Decimal> {
        self.materials
            .iter()
            .find(|d| d.raw_material_id == raw_material_id)
            .map(|d| d.amount)
    }
}

/// Computes what the cart would consume, without touching any store.
///
/// The BOM is read from the live catalog. Price and cost come from the cart
/// snapshot later, in [`record`].
pub fn plan(cart: &Cart, catalog: &CatalogStore, materials: &MaterialStore) -> CoreResult<SettlementPlan> {
    let mut plan = SettlementPlan::default();
    let mut product_slots: HashMap<&str, usize> = HashMap::new();
    let mut material_slots: HashMap<&str, usize> = HashMap::new();

    for line in cart.items() {
        let product = catalog
            .get(&line.product_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Product, &line.product_id))?;

        match product_slots.get(product.id.as_str()) {
            Some(&slot) => {
                let demand = &mut plan.products[slot];
                demand.quantity = checked_units("quantity", demand.quantity, line.quantity)?;
            }
            None => {
                product_slots.insert(&product.id, plan.products.len());
                plan.products.push(ProductDemand {
                    product_id: product.id.clone(),
                    quantity: line.quantity,
                });
            }
        }

        for ingredient in &product.ingredients {
            if !materials.contains(&ingredient.raw_material_id) {
                return Err(CoreError::UnresolvedReference {
                    referrer: format!("Product {}", product.id),
                    entity: EntityKind::RawMaterial,
                    id: ingredient.raw_material_id.clone(),
                });
            }

            let amount = checked_product("amount", ingredient.amount, Decimal::from(line.quantity))?;
            match material_slots.get(ingredient.raw_material_id.as_str()) {
                Some(&slot) => {
                    let demand = &mut plan.materials[slot];
                    demand.amount = checked_sum("amount", demand.amount, amount)?;
                }
                None => {
                    material_slots.insert(&ingredient.raw_material_id, plan.materials.len());
                    plan.materials.push(MaterialDemand {
                        raw_material_id: ingredient.raw_material_id.clone(),
                        amount,
                    });
                }
            }
        }
    }

    Ok(plan)
}

// =============================================================================
// Validate / Apply
// =============================================================================

/// Checks every demand against current stock. Products first, then materials.
pub fn validate(plan: &SettlementPlan, catalog: &CatalogStore, materials: &MaterialStore) -> CoreResult<()> {
    for demand in &plan.products {
        let product = catalog
            .get(&demand.product_id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Product, &demand.product_id))?;
        if !product.can_sell(demand.quantity) {
            return Err(CoreError::InsufficientStock {
                entity: EntityKind::Product,
                id: demand.product_id.clone(),
                requested: Decimal::from(demand.quantity),
                available: Decimal::from(product.stock),
            });
        }
    }

    for demand in &plan.materials {
        let material = materials.get(&demand.raw_material_id).ok_or_else(|| {
            CoreError::not_found(EntityKind::RawMaterial, &demand.raw_material_id)
        })?;
        if demand.amount > material.stock {
            return Err(CoreError::InsufficientStock {
                entity: EntityKind::RawMaterial,
                id: demand.raw_material_id.clone(),
                requested: demand.amount,
                available: material.stock,
            });
        }
    }

    Ok(())
}

/// Applies a validated plan.
pub fn apply(plan: &SettlementPlan, catalog: &mut CatalogStore, materials: &mut MaterialStore) -> CoreResult<()> {
    for demand in &plan.products {
        catalog.decrement_stock(&demand.product_id, demand.quantity)?;
    }
    for demand in &plan.materials {
        materials.decrement_stock(&demand.raw_material_id, demand.amount)?;
    }
    Ok(())
}

// =============================================================================
// Record
// =============================================================================

/// Freezes the cart into a transaction and appends it to `ledger`.
pub fn record(cart: &Cart, payment: PaymentDetails, ledger: &mut TransactionLedger) -> CoreResult<Transaction> {
    let items: Vec<TransactionItem> = cart
        .items()
        .iter()
        .map(|line| TransactionItem {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            cost_price: line.cost_price,
            total_price: line.line_total(),
            profit: line.line_profit(),
        })
        .collect();

    let subtotal: Money = items.iter().map(|i| i.total_price).sum();
    let profit: Money = items.iter().map(|i| i.profit).sum();
    let now = Utc::now();

    let transaction = Transaction {
        id: generate_id(),
        date: now,
        items,
        subtotal,
        discount: payment.discount,
        tax: payment.tax,
        total: subtotal - payment.discount + payment.tax,
        profit,
        payment_method: payment.payment_method,
        cashier_name: payment.cashier_name.trim().to_string(),
        customer_name: payment.customer_name.filter(|c| !c.trim().is_empty()),
        notes: payment.notes.filter(|n| !n.trim().is_empty()),
        created_at: now,
        updated_at: now,
    };

    Ok(ledger.append(transaction)?.clone())
}

// =============================================================================
// Checkout
// =============================================================================

/// Settles `cart` against the stores.
///
/// ## Errors
/// Every error is raised before the first decrement, so a failed checkout
/// leaves `catalog`, `materials` and `ledger` exactly as they were:
/// - `EmptyCart`
/// - `Validation` (bad payment details)
/// - `NotFound` (a cart product was deleted)
/// - `UnresolvedReference` (a BOM names a missing material)
/// - `InsufficientStock`
pub fn checkout(
    cart: &Cart,
    catalog: &mut CatalogStore,
    materials: &mut MaterialStore,
    ledger: &mut TransactionLedger,
    payment: PaymentDetails,
) -> CoreResult<Transaction> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    payment.validate(cart.subtotal())?;

    let plan = plan(cart, catalog, materials)?;
    validate(&plan, catalog, materials)?;
    apply(&plan, catalog, materials)?;
    record(cart, payment, ledger)
}

// =============================================================================
// Unit Tests
// =============================================================================
