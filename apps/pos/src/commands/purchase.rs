//! # Purchase Commands
//!
//! Supplier deliveries. Recording one raises raw-material stock and replaces
//! each delivered material's unit cost with the price paid.

use barista_core::{Money, Purchase, PurchaseOrder};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::Shop;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseList {
    pub purchases: Vec<Purchase>,
    pub total_spent: Money,
}

pub async fn record_purchase(shop: &Shop, order: PurchaseOrder) -> Result<Purchase, ApiError> {
    debug!(supplier = %order.supplier, items = order.items.len(), "record_purchase command");

    Ok(shop.record_purchase(order).await?)
}

/// Lists purchases, optionally from one supplier (case-insensitive).
pub async fn list_purchases(shop: &Shop, supplier: Option<&str>) -> PurchaseList {
    debug!(?supplier, "list_purchases command");

    let inventory = shop.snapshot().await;
    let ledger = inventory.purchases();
    match supplier {
        Some(name) => {
            let purchases: Vec<Purchase> =
                ledger.by_supplier(name).into_iter().cloned().collect();
            PurchaseList {
                total_spent: purchases.iter().map(|p| p.total_amount).sum(),
                purchases,
            }
        }
        None => PurchaseList {
            purchases: ledger.list().to_vec(),
            total_spent: ledger.total_spent(),
        },
    }
}

pub async fn get_purchase(shop: &Shop, id: &str) -> Result<Purchase, ApiError> {
    shop.snapshot()
        .await
        .purchases()
        .get(id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Purchase", id))
}
