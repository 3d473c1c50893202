//! # Shop State
//!
//! The live store: the published [`Inventory`] snapshot, the writer gate, and
//! the save-after-every-change loop.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  mutator (checkout, record_purchase, CRUD)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  writer.lock()  ◄── one mutator at a time                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  next = clone of the published snapshot                                │
//! │  change(&mut next)?  ──── CoreError ──► ShopError::Core, nothing kept  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  save touched + previously dirty collections (retried)                 │
//! │       │                                                                 │
//! │       ├── saved ──────► publish next ──► Ok(value)                     │
//! │       └── failed ─────► publish next ──► ShopError::Unsaved            │
//! │                          (stays dirty until flush() succeeds)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Readers take [`Shop::snapshot`], an `Arc` clone of the last published
//! inventory. They never wait for validation or a save in progress.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use barista_core::{
    CoreResult, Inventory, NewProduct, NewRawMaterial, PaymentDetails, Product, ProductPatch,
    Purchase, PurchaseOrder, RawMaterial, RawMaterialPatch, Transaction,
};
use barista_db::{encode_batch, load_inventory, CollectionName, CollectionStore, DbError};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::error::{Committed, ShopError, ShopResult};
use crate::state::CartState;

const SALE: &[CollectionName] = &[
    CollectionName::Products,
    CollectionName::RawMaterials,
    CollectionName::Transactions,
];
const PURCHASE: &[CollectionName] = &[CollectionName::RawMaterials, CollectionName::Purchases];
const PRODUCTS: &[CollectionName] = &[CollectionName::Products];
const RAW_MATERIALS: &[CollectionName] = &[CollectionName::RawMaterials];

/// Collections changed in memory but not yet saved. Guarded by the writer gate.
#[derive(Debug, Default)]
struct Pending {
    dirty: BTreeSet<CollectionName>,
}

pub struct Shop {
    store: Arc<dyn CollectionStore>,
    current: RwLock<Arc<Inventory>>,
    writer: Mutex<Pending>,
    save_attempts: u32,
    retry_delay: Duration,
}

impl std::fmt::Debug for Shop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shop")
            .field("save_attempts", &self.save_attempts)
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}

impl Shop {
    /// Loads the store from `store`, seeding absent collections.
    pub async fn open(store: Arc<dyn CollectionStore>, save_attempts: u32) -> ShopResult<Self> {
        let loaded = load_inventory(store.as_ref()).await?;
        if !loaded.seeded.is_empty() {
            info!(collections = ?loaded.seeded, "Started from the default dataset");
        }

        Ok(Shop {
            store,
            current: RwLock::new(Arc::new(loaded.inventory)),
            writer: Mutex::new(Pending::default()),
            save_attempts: save_attempts.max(1),
            retry_delay: Duration::from_millis(50),
        })
    }

    /// Sets the base pause between save attempts (multiplied by the attempt number).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// The last published inventory.
    pub async fn snapshot(&self) -> Arc<Inventory> {
        self.current.read().await.clone()
    }

    /// Collections changed in memory but not yet saved.
    pub async fn pending(&self) -> Vec<CollectionName> {
        self.writer.lock().await.dirty.iter().copied().collect()
    }

    pub async fn is_dirty(&self) -> bool {
        !self.writer.lock().await.dirty.is_empty()
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Settles the session cart.
    ///
    /// The cart is read and cleared under the writer gate, so two checkouts
    /// of one cart settle it once; the later one sees an empty cart. On
    /// success, and when the sale is applied but unsaved, the cart is
    /// cleared. Any other failure leaves the cart as it was.
    pub async fn checkout(
        &self,
        cart: &CartState,
        payment: PaymentDetails,
    ) -> ShopResult<Transaction> {
        let result = self
            .mutate(SALE, |inv| {
                cart.with_cart_mut(|items| {
                    let transaction = inv.checkout(items, payment)?;
                    items.clear();
                    Ok(transaction)
                })
            })
            .await;

        if let Ok(transaction) = &result {
            info!(
                transaction_id = %transaction.id,
                total = %transaction.total,
                items = transaction.items.len(),
                payment_method = ?transaction.payment_method,
                "Sale completed"
            );
        }
        result
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    pub async fn record_purchase(&self, order: PurchaseOrder) -> ShopResult<Purchase> {
        let purchase = self.mutate(PURCHASE, |inv| inv.record_purchase(order)).await?;
        info!(
            purchase_id = %purchase.id,
            supplier = %purchase.supplier,
            total = %purchase.total_amount,
            "Purchase recorded"
        );
        Ok(purchase)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub async fn create_product(&self, input: NewProduct) -> ShopResult<Product> {
        self.mutate(PRODUCTS, |inv| inv.create_product(input)).await
    }

    pub async fn update_product(&self, id: &str, patch: ProductPatch) -> ShopResult<Product> {
        self.mutate(PRODUCTS, |inv| inv.update_product(id, patch)).await
    }

    pub async fn delete_product(&self, id: &str) -> ShopResult<Product> {
        self.mutate(PRODUCTS, |inv| inv.delete_product(id)).await
    }

    pub async fn restock_product(&self, id: &str, quantity: i64) -> ShopResult<Product> {
        self.mutate(PRODUCTS, |inv| inv.restock_product(id, quantity))
            .await
    }

    // =========================================================================
    // Raw Materials
    // =========================================================================

    pub async fn create_material(&self, input: NewRawMaterial) -> ShopResult<RawMaterial> {
        self.mutate(RAW_MATERIALS, |inv| inv.create_material(input))
            .await
    }

    pub async fn update_material(
        &self,
        id: &str,
        patch: RawMaterialPatch,
    ) -> ShopResult<RawMaterial> {
        self.mutate(RAW_MATERIALS, |inv| inv.update_material(id, patch))
            .await
    }

    pub async fn delete_material(&self, id: &str) -> ShopResult<RawMaterial> {
        self.mutate(RAW_MATERIALS, |inv| inv.delete_material(id))
            .await
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Saves every dirty collection. Returns how many were written.
    pub async fn flush(&self) -> ShopResult<usize> {
        let mut pending = self.writer.lock().await;
        if pending.dirty.is_empty() {
            return Ok(0);
        }

        let snapshot = self.snapshot().await;
        let names: Vec<CollectionName> = pending.dirty.iter().copied().collect();
        self.save(&snapshot, &names)
            .await
            .map_err(|(source, _)| ShopError::Storage(source))?;

        pending.dirty.clear();
        info!(collections = ?names, "Pending changes saved");
        Ok(names.len())
    }

    /// Runs `change` on a private copy, saves, then publishes the copy.
    async fn mutate<T, F>(&self, touched: &[CollectionName], change: F) -> ShopResult<T>
    where
        F: FnOnce(&mut Inventory) -> CoreResult<T>,
        T: Into<Committed>,
    {
        let mut pending = self.writer.lock().await;

        let mut next = Inventory::clone(&*self.snapshot().await);
        let value = change(&mut next)?;

        pending.dirty.extend(touched.iter().copied());
        let names: Vec<CollectionName> = pending.dirty.iter().copied().collect();
        let saved = self.save(&next, &names).await;

        *self.current.write().await = Arc::new(next);

        match saved {
            Ok(()) => {
                pending.dirty.clear();
                Ok(value)
            }
            Err((source, attempts)) => {
                let committed: Committed = value.into();
                error!(
                    %committed,
                    attempts,
                    error = %source,
                    "Change applied in memory but not saved"
                );
                Err(ShopError::Unsaved {
                    committed,
                    attempts,
                    source,
                })
            }
        }
    }

    /// Encodes `names` from `inventory` and saves them, retrying transient
    /// failures up to `save_attempts` times.
    async fn save(
        &self,
        inventory: &Inventory,
        names: &[CollectionName],
    ) -> Result<(), (DbError, u32)> {
        let batch = encode_batch(inventory, names).map_err(|e| (e, 0))?;

        let mut attempt = 1;
        loop {
            match self.store.save(&batch).await {
                Ok(()) => {
                    debug!(collections = ?names, attempt, "Collections saved");
                    return Ok(());
                }
                Err(e) if attempt >= self.save_attempts || !e.is_transient() => {
                    return Err((e, attempt))
                }
                Err(e) => {
                    warn!(attempt, max = self.save_attempts, error = %e, "Save failed, retrying");
                    tokio::time::sleep(self.retry_delay * attempt).await;
                    attempt += 1;
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
