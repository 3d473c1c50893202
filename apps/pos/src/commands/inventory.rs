//! # Inventory Commands
//!
//! Raw materials: listing, maintenance, and the stock overview.

use barista_core::{Money, NewRawMaterial, RawMaterial, RawMaterialPatch};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::{ConfigState, Shop};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDto {
    pub id: String,
    pub name: String,
    pub unit: String,
    #[ts(type = "string")]
    pub stock: Decimal,
    pub unit_cost: Money,
    pub supplier: String,
    /// stock × unit cost
    pub stock_value: Money,
    pub low_stock: bool,
    /// Number of products whose recipe uses this material
    pub used_by: usize,
}

impl MaterialDto {
    fn build(material: &RawMaterial, used_by: usize, config: &ConfigState) -> Self {
        MaterialDto {
            id: material.id.clone(),
            name: material.name.clone(),
            unit: material.unit.clone(),
            stock: material.stock,
            unit_cost: material.unit_cost,
            supplier: material.supplier.clone(),
            stock_value: material.stock_value(),
            low_stock: material.stock < config.material_low_stock,
            used_by,
        }
    }
}

/// Counts for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub product_count: usize,
    pub material_count: usize,
    /// Σ stock × unit cost over all raw materials
    pub stock_value: Money,
    pub low_stock_products: usize,
    pub low_stock_materials: usize,
}

/// Lists raw materials, filtered by name or supplier when `query` is given.
pub async fn list_materials(
    shop: &Shop,
    config: &ConfigState,
    query: Option<&str>,
) -> Result<Vec<MaterialDto>, ApiError> {
    debug!(?query, "list_materials command");

    let inventory = shop.snapshot().await;
    let materials: Vec<&RawMaterial> = match query {
        Some(q) => inventory.materials().search(q)?,
        None => inventory.materials().list().iter().collect(),
    };

    Ok(materials
        .into_iter()
        .map(|m| {
            let used_by = inventory.catalog().using_material(&m.id).count();
            MaterialDto::build(m, used_by, config)
        })
        .collect())
}

pub async fn low_stock_materials(shop: &Shop, config: &ConfigState) -> Vec<MaterialDto> {
    let inventory = shop.snapshot().await;
    inventory
        .materials()
        .low_stock(config.material_low_stock)
        .into_iter()
        .map(|m| {
            let used_by = inventory.catalog().using_material(&m.id).count();
            MaterialDto::build(m, used_by, config)
        })
        .collect()
}

pub async fn inventory_summary(shop: &Shop, config: &ConfigState) -> InventorySummary {
    let inventory = shop.snapshot().await;
    InventorySummary {
        product_count: inventory.catalog().len(),
        material_count: inventory.materials().len(),
        stock_value: inventory.materials().inventory_value().round_to_cents(),
        low_stock_products: inventory.catalog().low_stock(config.low_stock_threshold).len(),
        low_stock_materials: inventory.materials().low_stock(config.material_low_stock).len(),
    }
}

pub async fn create_material(
    shop: &Shop,
    config: &ConfigState,
    input: NewRawMaterial,
) -> Result<MaterialDto, ApiError> {
    debug!(name = %input.name, "create_material command");

    let material = shop.create_material(input).await?;
    info!(id = %material.id, name = %material.name, "Raw material created");
    Ok(MaterialDto::build(&material, 0, config))
}

pub async fn update_material(
    shop: &Shop,
    config: &ConfigState,
    id: &str,
    patch: RawMaterialPatch,
) -> Result<MaterialDto, ApiError> {
    debug!(id = %id, "update_material command");

    let material = shop.update_material(id, patch).await?;
    let used_by = shop.snapshot().await.catalog().using_material(id).count();
    Ok(MaterialDto::build(&material, used_by, config))
}

/// Deletes a raw material. Fails while any product's recipe still uses it.
pub async fn delete_material(shop: &Shop, id: &str) -> Result<(), ApiError> {
    debug!(id = %id, "delete_material command");

    let material = shop.delete_material(id).await?;
    info!(id = %material.id, name = %material.name, "Raw material deleted");
    Ok(())
}
