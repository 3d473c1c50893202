//! # Catalog Store
//!
//! Owns the sellable [`Product`] records and their finished-unit stock.
//!
//! ## Stock Rule
//! ```text
//! decrement_stock(id, qty)
//!   qty > stock  ──► InsufficientStock (record untouched)
//!   qty ≤ stock  ──► stock -= qty, updatedAt bumped
//! ```
//!
//! Bill-of-materials references are validated for shape here (positive
//! amounts, no duplicates). Whether they resolve to a raw material is the
//! job of [`crate::inventory::Inventory`], which owns both stores.

use std::collections::BTreeSet;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::collection::Collection;
use crate::error::{CoreError, CoreResult, EntityKind, ValidationError};
use crate::types::{generate_id, NewProduct, Product, ProductPatch, Record};
use crate::validation::{
    checked_units, normalize_search_query, validate_new_product, validate_product,
};

/// The product catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CatalogStore {
    products: Collection<Product>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from existing records (loaded or seeded).
    ///
    /// Every record must pass the same checks as an update, so a hand-edited
    /// store with a negative stock or a zero price is refused on load.
    pub fn from_records(products: Vec<Product>) -> CoreResult<Self> {
        for product in &products {
            validate_product(product)?;
        }
        let products = Collection::from_records(products).map_err(|id| {
            ValidationError::Duplicate {
                field: "product id".to_string(),
                value: id,
            }
        })?;
        Ok(CatalogStore { products })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a product with a generated id and timestamps.
    pub fn create(&mut self, input: NewProduct) -> CoreResult<Product> {
        validate_new_product(&input)?;

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            name: input.name.trim().to_string(),
            price: input.price,
            cost_price: input.cost_price,
            stock: input.stock,
            category: input.category.trim().to_string(),
            image: input.image,
            ingredients: input.ingredients,
            created_at: now,
            updated_at: now,
        };

        match self.products.insert(product) {
            Ok(created) => Ok(created.clone()),
            Err(rejected) => Err(ValidationError::Duplicate {
                field: "product id".to_string(),
                value: rejected.id,
            }
            .into()),
        }
    }

    /// Merges `patch` into the product, re-validates and bumps `updated_at`.
    ///
    /// The stored record is only replaced once the merged value is valid.
    pub fn update(&mut self, id: &str, patch: ProductPatch) -> CoreResult<Product> {
        let current = self
            .products
            .get(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Product, id))?;

        let mut merged = current.clone();
        if let Some(name) = patch.name {
            merged.name = name.trim().to_string();
        }
        if let Some(price) = patch.price {
            merged.price = price;
        }
        if let Some(cost_price) = patch.cost_price {
            merged.cost_price = cost_price;
        }
        if let Some(stock) = patch.stock {
            merged.stock = stock;
        }
        if let Some(category) = patch.category {
            merged.category = category.trim().to_string();
        }
        if let Some(image) = patch.image {
            merged.image = Some(image);
        }
        if let Some(ingredients) = patch.ingredients {
            merged.ingredients = ingredients;
        }
        validate_product(&merged)?;
        merged.touch(Utc::now());

        let slot = self
            .products
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Product, id))?;
        *slot = merged.clone();
        Ok(merged)
    }

    /// Removes a product and returns it.
    pub fn delete(&mut self, id: &str) -> CoreResult<Product> {
        self.products
            .remove(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Product, id))
    }

    /// Reduces finished-unit stock, failing without change on a shortfall.
    pub fn decrement_stock(&mut self, id: &str, qty: i64) -> CoreResult<()> {
        check_stock_delta(qty)?;
        let product = self
            .products
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Product, id))?;

        if !product.can_sell(qty) {
            return Err(CoreError::InsufficientStock {
                entity: EntityKind::Product,
                id: id.to_string(),
                requested: Decimal::from(qty),
                available: Decimal::from(product.stock),
            });
        }

        product.stock -= qty;
        product.touch(Utc::now());
        Ok(())
    }

    /// Adds finished units (restock, manual correction).
    pub fn increment_stock(&mut self, id: &str, qty: i64) -> CoreResult<()> {
        check_stock_delta(qty)?;
        let product = self
            .products
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Product, id))?;

        product.stock = checked_units("stock", product.stock, qty)?;
        product.touch(Utc::now());
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.products.contains(id)
    }

    /// All products in insertion order.
    pub fn list(&self) -> &[Product] {
        self.products.as_slice()
    }

    /// Case-insensitive name search with an optional exact category filter.
    ///
    /// An empty query matches every product.
    pub fn search(&self, query: &str, category: Option<&str>) -> CoreResult<Vec<&Product>> {
        let query = normalize_search_query(query)?;
        Ok(self
            .products
            .iter()
            .filter(|p| category.map_or(true, |c| p.category.eq_ignore_ascii_case(c)))
            .filter(|p| query.is_empty() || p.name.to_lowercase().contains(&query))
            .collect())
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Products whose stock is strictly below `threshold`.
    pub fn low_stock(&self, threshold: i64) -> Vec<&Product> {
        self.products.iter().filter(|p| p.stock < threshold).collect()
    }

    /// Products whose BOM references the given raw material.
    pub fn using_material<'a>(&'a self, raw_material_id: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products
            .iter()
            .filter(move |p| p.uses_material(raw_material_id))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn check_stock_delta(qty: i64) -> CoreResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }
    Ok(())
}

impl<'de> Deserialize<'de> for CatalogStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let products = Vec::<Product>::deserialize(deserializer)?;
        CatalogStore::from_records(products).map_err(de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
