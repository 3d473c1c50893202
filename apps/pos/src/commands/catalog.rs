//! # Catalog Commands
//!
//! Product search for the register, plus product maintenance.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  User types "lat" with category chip "Coffee"                          │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  search_products(shop, config, "lat", Some("Coffee"))                  │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  snapshot().catalog().search()  ◄── no lock held, never blocks a sale  │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  [ProductDto { name: "Latte", stock: 75, recipe: [...] }]               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use barista_core::{Inventory, Money, NewProduct, Product, ProductPatch};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::{ConfigState, Shop};

/// Product as shown on the register and in the product list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: Money,
    pub cost_price: Money,
    /// Price minus cost for one unit
    pub margin: Money,
    pub stock: i64,
    /// Below the configured low-stock threshold
    pub low_stock: bool,
    pub image: Option<String>,
    pub recipe: Vec<RecipeLine>,
}

/// One BOM entry with its raw material resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLine {
    pub raw_material_id: String,
    /// `None` if the raw material no longer exists
    pub material_name: Option<String>,
    pub unit: Option<String>,
    #[ts(type = "string")]
    pub amount: Decimal,
}

impl ProductDto {
    pub fn build(product: &Product, inventory: &Inventory, config: &ConfigState) -> Self {
        let recipe = product
            .ingredients
            .iter()
            .map(|ingredient| {
                let material = inventory.materials().get(&ingredient.raw_material_id);
                RecipeLine {
                    raw_material_id: ingredient.raw_material_id.clone(),
                    material_name: material.map(|m| m.name.clone()),
                    unit: material.map(|m| m.unit.clone()),
                    amount: ingredient.amount,
                }
            })
            .collect();

        ProductDto {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            cost_price: product.cost_price,
            margin: product.unit_margin(),
            stock: product.stock,
            low_stock: product.stock < config.low_stock_threshold,
            image: product.image.clone(),
            recipe,
        }
    }
}

/// Searches products by name, optionally within one category.
///
/// An empty query lists every product (of the category).
pub async fn search_products(
    shop: &Shop,
    config: &ConfigState,
    query: &str,
    category: Option<&str>,
) -> Result<Vec<ProductDto>, ApiError> {
    debug!(query = %query, ?category, "search_products command");

    let inventory = shop.snapshot().await;
    let products = inventory.catalog().search(query, category)?;
    Ok(products
        .into_iter()
        .map(|p| ProductDto::build(p, &inventory, config))
        .collect())
}

pub async fn get_product(
    shop: &Shop,
    config: &ConfigState,
    id: &str,
) -> Result<ProductDto, ApiError> {
    debug!(id = %id, "get_product command");

    let inventory = shop.snapshot().await;
    let product = inventory
        .catalog()
        .get(id)
        .ok_or_else(|| ApiError::not_found("Product", id))?;
    Ok(ProductDto::build(product, &inventory, config))
}

/// Distinct categories, sorted.
pub async fn list_categories(shop: &Shop) -> Vec<String> {
    shop.snapshot().await.catalog().categories()
}

/// Products below the configured threshold, for the dashboard alert list.
pub async fn low_stock_products(shop: &Shop, config: &ConfigState) -> Vec<ProductDto> {
    let inventory = shop.snapshot().await;
    inventory
        .catalog()
        .low_stock(config.low_stock_threshold)
        .into_iter()
        .map(|p| ProductDto::build(p, &inventory, config))
        .collect()
}

pub async fn create_product(
    shop: &Shop,
    config: &ConfigState,
    input: NewProduct,
) -> Result<ProductDto, ApiError> {
    debug!(name = %input.name, "create_product command");

    let product = shop.create_product(input).await?;
    info!(id = %product.id, name = %product.name, "Product created");
    Ok(ProductDto::build(&product, &*shop.snapshot().await, config))
}

pub async fn update_product(
    shop: &Shop,
    config: &ConfigState,
    id: &str,
    patch: ProductPatch,
) -> Result<ProductDto, ApiError> {
    debug!(id = %id, "update_product command");

    let product = shop.update_product(id, patch).await?;
    Ok(ProductDto::build(&product, &*shop.snapshot().await, config))
}

pub async fn delete_product(shop: &Shop, id: &str) -> Result<(), ApiError> {
    debug!(id = %id, "delete_product command");

    let product = shop.delete_product(id).await?;
    info!(id = %product.id, name = %product.name, "Product deleted");
    Ok(())
}

/// Adds finished units to a product's stock.
pub async fn restock_product(
    shop: &Shop,
    config: &ConfigState,
    id: &str,
    quantity: i64,
) -> Result<ProductDto, ApiError> {
    debug!(id = %id, quantity, "restock_product command");

    let product = shop.restock_product(id, quantity).await?;
    Ok(ProductDto::build(&product, &*shop.snapshot().await, config))
}
