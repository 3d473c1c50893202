//! # Purchase Receipts
//!
//! Turns a supplier delivery into a [`Purchase`] and replenishes the
//! raw-material stock it names.
//!
//! ## Recording Flow
//! ```text
//! PurchaseOrder { supplier, date, items, notes }
//!      │
//!      ▼
//! 1. Validate      supplier non-empty, ≥1 item, quantity > 0, unitCost > 0
//!      │
//!      ▼
//! 2. Resolve       every rawMaterialId must exist ──► UnresolvedReference
//!      │           resulting stock and totals must fit ──► OutOfRange
//!      │           (nothing applied yet)
//!      ▼
//! 3. Apply         increment_stock(id, quantity, Some(unitCost)) per item
//!      │           (unit cost is overwritten, not averaged)
//!      ▼
//! 4. Append        Purchase { totalAmount = Σ quantity × unitCost }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, EntityKind, ValidationError};
use crate::ledger::Ledger;
use crate::materials::MaterialStore;
use crate::money::Money;
use crate::types::{generate_id, Purchase, PurchaseItem};
use crate::validation::{
    checked_money, checked_sum, validate_name, validate_positive_amount, validate_positive_money,
    ValidationResult,
};

/// One requested line of a delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItemInput {
    pub raw_material_id: String,
    #[ts(type = "string")]
    pub quantity: Decimal,
    pub unit_cost: Money,
}

/// A delivery to be recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub supplier: String,
    /// Delivery date. Defaults to the time of recording.
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    pub items: Vec<PurchaseItemInput>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PurchaseOrder {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_name("supplier", &self.supplier)?;
        if self.items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            });
        }
        for item in &self.items {
            validate_name("rawMaterialId", &item.raw_material_id)?;
            validate_positive_amount("quantity", item.quantity)?;
            validate_positive_money("unitCost", item.unit_cost)?;
        }
        Ok(())
    }
}

impl Ledger<Purchase> {
    /// Records a delivery and replenishes `materials`.
    ///
    /// Every id is resolved before the first increment, so an unknown raw
    /// material leaves both the store and the ledger untouched. The same
    /// material listed twice is applied line by line and the last unit cost
    /// wins.
    pub fn record(&mut self, materials: &mut MaterialStore, order: PurchaseOrder) -> CoreResult<Purchase> {
        order.validate()?;

        if let Some(missing) = order
            .items
            .iter()
            .find(|item| !materials.contains(&item.raw_material_id))
        {
            return Err(CoreError::UnresolvedReference {
                referrer: format!("Purchase from {}", order.supplier.trim()),
                entity: EntityKind::RawMaterial,
                id: missing.raw_material_id.clone(),
            });
        }

        // Resulting stock per material, so an overflow is caught before
        // the first increment.
        {
            let mut received: HashMap<&str, Decimal> = HashMap::new();
            for item in &order.items {
                let stock = match received.get(item.raw_material_id.as_str()) {
                    Some(&stock) => stock,
                    None => materials
                        .get(&item.raw_material_id)
                        .map_or(Decimal::ZERO, |m| m.stock),
                };
                received.insert(
                    &item.raw_material_id,
                    checked_sum("stock", stock, item.quantity)?,
                );
            }
        }

        let items: Vec<PurchaseItem> = order
            .items
            .into_iter()
            .map(|item| {
                let total = item
                    .unit_cost
                    .checked_times(item.quantity)
                    .ok_or_else(|| ValidationError::OutOfRange {
                        field: "total".to_string(),
                    })?;
                Ok(PurchaseItem {
                    total,
                    raw_material_id: item.raw_material_id,
                    quantity: item.quantity,
                    unit_cost: item.unit_cost,
                })
            })
            .collect::<ValidationResult<_>>()?;
        let total_amount = items.iter().try_fold(Money::zero(), |sum, item| {
            checked_money("totalAmount", sum, item.total)
        })?;

        for item in &items {
            materials.increment_stock(&item.raw_material_id, item.quantity, Some(item.unit_cost))?;
        }

        let now = Utc::now();
        let purchase = Purchase {
            id: generate_id(),
            date: order.date.unwrap_or(now),
            supplier: order.supplier.trim().to_string(),
            total_amount,
            items,
            notes: order.notes.filter(|n| !n.trim().is_empty()),
            created_at: now,
            updated_at: now,
        };

        Ok(self.append(purchase)?.clone())
    }

    /// Purchases from one supplier (case-insensitive), oldest first.
    pub fn by_supplier(&self, supplier: &str) -> Vec<&Purchase> {
        let supplier = supplier.trim();
        self.list()
            .iter()
            .filter(|p| p.supplier.eq_ignore_ascii_case(supplier))
            .collect()
    }

    /// Total spent across all recorded purchases.
    pub fn total_spent(&self) -> Money {
        self.list().iter().map(|p| p.total_amount).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::PurchaseLedger;
    use crate::types::NewRawMaterial;
    use rust_decimal_macros::dec;

    fn store_with_beans() -> (MaterialStore, String) {
        let mut store = MaterialStore::new();
        let id = store
            .create(NewRawMaterial {
                name: "Coffee Beans".to_string(),
                unit: "g".to_string(),
                stock: dec!(5000),
                unit_cost: Money::new(dec!(0.05)),
                supplier: "Coffee Supplier Inc.".to_string(),
            })
            .unwrap()
            .id;
        (store, id)
    }

    fn order(items: Vec<PurchaseItemInput>) -> PurchaseOrder {
        PurchaseOrder {
            supplier: "Coffee Supplier Inc.".to_string(),
            date: None,
            items,
            notes: Some("Monthly beans".to_string()),
        }
    }

    #[test]
    fn test_record_replenishes_and_overwrites_cost() {
        let (mut store, beans) = store_with_beans();
        let mut ledger = PurchaseLedger::new();

        let purchase = ledger
            .record(
                &mut store,
                order(vec![PurchaseItemInput {
                    raw_material_id: beans.clone(),
                    quantity: dec!(2000),
                    unit_cost: Money::new(dec!(0.06)),
                }]),
            )
            .unwrap();

        assert_eq!(purchase.total_amount, Money::new(dec!(120)));
        assert_eq!(purchase.items[0].total, Money::new(dec!(120)));
        let m = store.get(&beans).unwrap();
        assert_eq!(m.stock, dec!(7000));
        assert_eq!(m.unit_cost, Money::new(dec!(0.06)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_unresolved_item_applies_nothing() {
        let (mut store, beans) = store_with_beans();
        let before = store.clone();
        let mut ledger = PurchaseLedger::new();

        let err = ledger
            .record(
                &mut store,
                order(vec![
                    PurchaseItemInput {
                        raw_material_id: beans,
                        quantity: dec!(100),
                        unit_cost: Money::new(dec!(0.05)),
                    },
                    PurchaseItemInput {
                        raw_material_id: "ghost".to_string(),
                        quantity: dec!(1),
                        unit_cost: Money::new(dec!(1)),
                    },
                ]),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::UnresolvedReference { entity: EntityKind::RawMaterial, ref id, .. } if id == "ghost"
        ));
        assert_eq!(store, before);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_order_validation() {
        let (mut store, beans) = store_with_beans();
        let mut ledger = PurchaseLedger::new();

        assert!(ledger.record(&mut store, order(vec![])).is_err());

        let zero_qty = order(vec![PurchaseItemInput {
            raw_material_id: beans,
            quantity: dec!(0),
            unit_cost: Money::new(dec!(0.05)),
        }]);
        assert!(matches!(
            ledger.record(&mut store, zero_qty),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_same_material_twice_last_cost_wins() {
        let (mut store, beans) = store_with_beans();
        let mut ledger = PurchaseLedger::new();

        let purchase = ledger
            .record(
                &mut store,
                order(vec![
                    PurchaseItemInput {
                        raw_material_id: beans.clone(),
                        quantity: dec!(100),
                        unit_cost: Money::new(dec!(0.04)),
                    },
                    PurchaseItemInput {
                        raw_material_id: beans.clone(),
                        quantity: dec!(200),
                        unit_cost: Money::new(dec!(0.07)),
                    },
                ]),
            )
            .unwrap();

        assert_eq!(purchase.total_amount, Money::new(dec!(18)));
        let m = store.get(&beans).unwrap();
        assert_eq!(m.stock, dec!(5300));
        assert_eq!(m.unit_cost, Money::new(dec!(0.07)));
        assert_eq!(ledger.by_supplier("coffee supplier inc.").len(), 1);
    }

    #[test]
    fn test_oversized_delivery_applies_nothing() {
        let (mut store, beans) = store_with_beans();
        let mut ledger = PurchaseLedger::new();

        // Line total overflows.
        let err = ledger
            .record(
                &mut store,
                order(vec![PurchaseItemInput {
                    raw_material_id: beans.clone(),
                    quantity: Decimal::MAX,
                    unit_cost: Money::new(dec!(2)),
                }]),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));

        // Each line fits, the resulting stock does not.
        let half = Decimal::MAX / dec!(2);
        let line = || PurchaseItemInput {
            raw_material_id: beans.clone(),
            quantity: half,
            unit_cost: Money::new(dec!(0.000001)),
        };
        let err = ledger
            .record(&mut store, order(vec![line(), line()]))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field }) if field == "stock"
        ));

        assert_eq!(store.get(&beans).unwrap().stock, dec!(5000));
        assert!(ledger.is_empty());
    }
}
