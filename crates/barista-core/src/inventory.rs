//! # Inventory
//!
//! The whole store state in one value: catalog, raw materials and both
//! ledgers. Operations that span more than one of them live here.
//!
//! ```text
//! ┌──────────────────────────── Inventory ────────────────────────────┐
//! │                                                                   │
//! │   CatalogStore ──BOM ids──► MaterialStore ◄── PurchaseLedger      │
//! │        │                         │                                │
//! │        └──────── checkout ───────┴──────► TransactionLedger       │
//! │                                                                   │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Inventory` is a plain value with no interior mutability. The application
//! layer clones it, mutates the clone, persists, then publishes.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::catalog::CatalogStore;
use crate::error::{CoreError, CoreResult, EntityKind};
use crate::ledger::{PurchaseLedger, TransactionLedger};
use crate::materials::MaterialStore;
use crate::purchase::PurchaseOrder;
use crate::seed;
use crate::settlement::{self, PaymentDetails};
use crate::types::{
    Ingredient, NewProduct, NewRawMaterial, Product, ProductPatch, Purchase, RawMaterial,
    RawMaterialPatch, Transaction,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    products: CatalogStore,
    raw_materials: MaterialStore,
    purchases: PurchaseLedger,
    transactions: TransactionLedger,
}

impl Inventory {
    pub fn new(
        products: CatalogStore,
        raw_materials: MaterialStore,
        purchases: PurchaseLedger,
        transactions: TransactionLedger,
    ) -> Self {
        Inventory {
            products,
            raw_materials,
            purchases,
            transactions,
        }
    }

    /// The default dataset.
    pub fn seeded() -> CoreResult<Self> {
        Ok(Inventory {
            products: CatalogStore::from_records(seed::products())?,
            raw_materials: MaterialStore::from_records(seed::raw_materials())?,
            purchases: PurchaseLedger::from_records(seed::purchases())?,
            transactions: TransactionLedger::from_records(seed::transactions())?,
        })
    }

    /// Splits the inventory into its four collections.
    pub fn into_parts(self) -> (CatalogStore, MaterialStore, PurchaseLedger, TransactionLedger) {
        (
            self.products,
            self.raw_materials,
            self.purchases,
            self.transactions,
        )
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.products
    }

    pub fn materials(&self) -> &MaterialStore {
        &self.raw_materials
    }

    pub fn purchases(&self) -> &PurchaseLedger {
        &self.purchases
    }

    pub fn transactions(&self) -> &TransactionLedger {
        &self.transactions
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Creates a product whose BOM must resolve against the material store.
    pub fn create_product(&mut self, input: NewProduct) -> CoreResult<Product> {
        self.check_ingredients(&input.name, &input.ingredients)?;
        self.products.create(input)
    }

    pub fn update_product(&mut self, id: &str, patch: ProductPatch) -> CoreResult<Product> {
        if let Some(ingredients) = &patch.ingredients {
            self.check_ingredients(&format!("Product {}", id), ingredients)?;
        }
        self.products.update(id, patch)
    }

    pub fn delete_product(&mut self, id: &str) -> CoreResult<Product> {
        self.products.delete(id)
    }

    /// Adds finished units to a product.
    pub fn restock_product(&mut self, id: &str, qty: i64) -> CoreResult<Product> {
        self.products.increment_stock(id, qty)?;
        self.products
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(EntityKind::Product, id))
    }

    fn check_ingredients(&self, referrer: &str, ingredients: &[Ingredient]) -> CoreResult<()> {
        match ingredients
            .iter()
            .find(|i| !self.raw_materials.contains(&i.raw_material_id))
        {
            Some(missing) => Err(CoreError::UnresolvedReference {
                referrer: referrer.trim().to_string(),
                entity: EntityKind::RawMaterial,
                id: missing.raw_material_id.clone(),
            }),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Raw Materials
    // =========================================================================

    pub fn create_material(&mut self, input: NewRawMaterial) -> CoreResult<RawMaterial> {
        self.raw_materials.create(input)
    }

    pub fn update_material(&mut self, id: &str, patch: RawMaterialPatch) -> CoreResult<RawMaterial> {
        self.raw_materials.update(id, patch)
    }

    /// Removes a raw material no product's BOM references.
    pub fn delete_material(&mut self, id: &str) -> CoreResult<RawMaterial> {
        if let Some(product) = self.products.using_material(id).next() {
            return Err(CoreError::InUse {
                entity: EntityKind::RawMaterial,
                id: id.to_string(),
                used_by: format!("Product {}", product.name),
            });
        }
        self.raw_materials.delete(id)
    }

    // =========================================================================
    // Ledgers
    // =========================================================================

    /// Records a delivery. See [`PurchaseLedger::record`].
    pub fn record_purchase(&mut self, order: PurchaseOrder) -> CoreResult<Purchase> {
        self.purchases.record(&mut self.raw_materials, order)
    }

    /// Settles a cart. See [`settlement::checkout`].
    pub fn checkout(&mut self, cart: &Cart, payment: PaymentDetails) -> CoreResult<Transaction> {
        settlement::checkout(
            cart,
            &mut self.products,
            &mut self.raw_materials,
            &mut self.transactions,
            payment,
        )
    }
}
