//! # Inventory Snapshots
//!
//! Maps an [`Inventory`] onto the four stored collections and back.
//!
//! ## Load-on-Start
//! ```text
//! for each of products, rawMaterials, purchases, transactions:
//!     stored?  ──yes──► parse JSON array (duplicate ids and invalid records rejected)
//!        │
//!        no
//!        ▼
//!     take the default dataset's collection, remember it as seeded
//!
//! any seeded? ──► save all seeded collections in one transaction
//! ```

use barista_core::{CatalogStore, Inventory, MaterialStore, PurchaseLedger, TransactionLedger};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::collections::{CollectionName, CollectionStore};

/// Result of [`load_inventory`].
#[derive(Debug, Clone)]
pub struct LoadedInventory {
    pub inventory: Inventory,
    /// Collections that were absent and have been written from the defaults.
    pub seeded: Vec<CollectionName>,
}

/// Serializes one collection of `inventory` as a JSON array.
pub fn encode(inventory: &Inventory, name: CollectionName) -> DbResult<String> {
    let json = match name {
        CollectionName::Products => serde_json::to_string(inventory.catalog()),
        CollectionName::RawMaterials => serde_json::to_string(inventory.materials()),
        CollectionName::Purchases => serde_json::to_string(inventory.purchases()),
        CollectionName::Transactions => serde_json::to_string(inventory.transactions()),
    };
    json.map_err(|e| DbError::serialization(name.key(), e))
}

/// Serializes several collections, ready for [`CollectionStore::save`].
pub fn encode_batch(
    inventory: &Inventory,
    names: &[CollectionName],
) -> DbResult<Vec<(CollectionName, String)>> {
    names
        .iter()
        .map(|&name| Ok((name, encode(inventory, name)?)))
        .collect()
}

fn decode<T: DeserializeOwned>(name: CollectionName, json: &str) -> DbResult<T> {
    serde_json::from_str(json).map_err(|e| DbError::serialization(name.key(), e))
}

async fn load_or_seed<S, T>(
    store: &S,
    name: CollectionName,
    default: T,
    seeded: &mut Vec<CollectionName>,
) -> DbResult<T>
where
    S: CollectionStore + ?Sized,
    T: DeserializeOwned,
{
    match store.load(name).await? {
        Some(json) => {
            debug!(collection = %name, bytes = json.len(), "Collection loaded");
            decode(name, &json)
        }
        None => {
            seeded.push(name);
            Ok(default)
        }
    }
}

/// Loads every collection, seeding and persisting the absent ones.
pub async fn load_inventory<S>(store: &S) -> DbResult<LoadedInventory>
where
    S: CollectionStore + ?Sized,
{
    let defaults = Inventory::seeded().map_err(|e| DbError::Internal(e.to_string()))?;
    let (products, materials, purchases, transactions) = defaults.into_parts();
    let mut seeded = Vec::new();

    let products: CatalogStore =
        load_or_seed(store, CollectionName::Products, products, &mut seeded).await?;
    let materials: MaterialStore =
        load_or_seed(store, CollectionName::RawMaterials, materials, &mut seeded).await?;
    let purchases: PurchaseLedger =
        load_or_seed(store, CollectionName::Purchases, purchases, &mut seeded).await?;
    let transactions: TransactionLedger =
        load_or_seed(store, CollectionName::Transactions, transactions, &mut seeded).await?;

    let inventory = Inventory::new(products, materials, purchases, transactions);

    if !seeded.is_empty() {
        info!(collections = ?seeded, "Seeding absent collections with the default dataset");
        store.save(&encode_batch(&inventory, &seeded)?).await?;
    }

    info!(
        products = inventory.catalog().len(),
        raw_materials = inventory.materials().len(),
        purchases = inventory.purchases().len(),
        transactions = inventory.transactions().len(),
        "Inventory loaded"
    );

    Ok(LoadedInventory { inventory, seeded })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use barista_core::{Cart, Money, PaymentDetails, PaymentMethod};
    use rust_decimal_macros::dec;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn stored(db: &Database) -> Vec<Option<String>> {
        let mut out = Vec::new();
        for name in CollectionName::ALL {
            out.push(db.load(name).await.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_first_load_seeds_and_persists() {
        let db = db().await;

        let loaded = load_inventory(&db).await.unwrap();
        assert_eq!(loaded.seeded, CollectionName::ALL.to_vec());
        assert_eq!(loaded.inventory.catalog().len(), 4);
        assert_eq!(loaded.inventory.materials().len(), 6);
        assert!(stored(&db).await.iter().all(Option::is_some));

        let again = load_inventory(&db).await.unwrap();
        assert!(again.seeded.is_empty());
        assert_eq!(again.inventory, loaded.inventory);
    }

    #[tokio::test]
    async fn test_only_absent_collections_are_seeded() {
        let db = db().await;
        db.save(&[(CollectionName::Purchases, "[]".to_string())])
            .await
            .unwrap();

        let loaded = load_inventory(&db).await.unwrap();
        assert!(!loaded.seeded.contains(&CollectionName::Purchases));
        assert!(loaded.inventory.purchases().is_empty());
        assert_eq!(loaded.inventory.transactions().len(), 2);
    }

    #[tokio::test]
    async fn test_round_trip_is_byte_identical() {
        let db = db().await;
        let mut inventory = load_inventory(&db).await.unwrap().inventory;

        // Exercise fresh timestamps and sub-cent decimals too.
        let mut cart = Cart::new();
        cart.add_item(inventory.catalog().get("3").unwrap(), 2).unwrap();
        inventory
            .checkout(
                &cart,
                PaymentDetails {
                    discount: Money::from_cents(25),
                    tax: Money::new(dec!(0.75)),
                    payment_method: PaymentMethod::Card,
                    cashier_name: "Jane Smith".to_string(),
                    customer_name: Some("Regular Customer".to_string()),
                    notes: None,
                },
            )
            .unwrap();
        db.save(&encode_batch(&inventory, &CollectionName::ALL).unwrap())
            .await
            .unwrap();
        let first = stored(&db).await;

        let reloaded = load_inventory(&db).await.unwrap().inventory;
        db.save(&encode_batch(&reloaded, &CollectionName::ALL).unwrap())
            .await
            .unwrap();
        let second = stored(&db).await;

        assert_eq!(first, second);
        assert_eq!(reloaded, inventory);
    }

    #[tokio::test]
    async fn test_malformed_collection_is_reported() {
        let db = db().await;
        let dup = r#"[{"id":"1","name":"A","unit":"g","stock":"1","unitCost":"1","supplier":"S","createdAt":"2023-01-01T00:00:00Z","updatedAt":"2023-01-01T00:00:00Z"},{"id":"1","name":"B","unit":"g","stock":"1","unitCost":"1","supplier":"S","createdAt":"2023-01-01T00:00:00Z","updatedAt":"2023-01-01T00:00:00Z"}]"#;
        db.save(&[(CollectionName::RawMaterials, dup.to_string())])
            .await
            .unwrap();

        let err = load_inventory(&db).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Serialization { ref collection, .. } if collection == "rawMaterials"
        ));
    }

    #[tokio::test]
    async fn test_invalid_record_is_reported() {
        let db = db().await;
        let negative = r#"[{"id":"1","name":"Coffee Beans","unit":"g","stock":"-250","unitCost":"0.05","supplier":"S","createdAt":"2023-01-01T00:00:00Z","updatedAt":"2023-01-01T00:00:00Z"}]"#;
        db.save(&[(CollectionName::RawMaterials, negative.to_string())])
            .await
            .unwrap();

        match load_inventory(&db).await.unwrap_err() {
            DbError::Serialization {
                collection,
                message,
            } => {
                assert_eq!(collection, "rawMaterials");
                assert!(message.contains("stock cannot be negative"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
