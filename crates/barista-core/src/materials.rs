//! # Material Store
//!
//! Owns the [`RawMaterial`] records: stock measured in the material's unit
//! (grams, millilitres, pieces) and the current unit cost.
//!
//! ## Stock Movements
//! ```text
//!   Purchase received ──► increment_stock(id, qty, Some(unitCost))
//!                           stock += qty, unitCost overwritten
//!
//!   Sale settled      ──► decrement_stock(id, amount × qty)
//!                           fails with InsufficientStock, never goes below 0
//! ```

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::collection::Collection;
use crate::error::{CoreError, CoreResult, EntityKind, ValidationError};
use crate::money::Money;
use crate::types::{generate_id, NewRawMaterial, RawMaterial, RawMaterialPatch, Record};
use crate::validation::{
    checked_sum, normalize_search_query, validate_new_raw_material, validate_positive_amount,
    validate_positive_money, validate_raw_material,
};

/// The raw-material inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MaterialStore {
    materials: Collection<RawMaterial>,
}

impl MaterialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from existing records (loaded or seeded). Each record
    /// is validated as on update.
    pub fn from_records(materials: Vec<RawMaterial>) -> CoreResult<Self> {
        for material in &materials {
            validate_raw_material(material)?;
        }
        let materials = Collection::from_records(materials).map_err(|id| {
            ValidationError::Duplicate {
                field: "raw material id".to_string(),
                value: id,
            }
        })?;
        Ok(MaterialStore { materials })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn create(&mut self, input: NewRawMaterial) -> CoreResult<RawMaterial> {
        validate_new_raw_material(&input)?;

        let now = Utc::now();
        let material = RawMaterial {
            id: generate_id(),
            name: input.name.trim().to_string(),
            unit: input.unit.trim().to_string(),
            stock: input.stock,
            unit_cost: input.unit_cost,
            supplier: input.supplier.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        match self.materials.insert(material) {
            Ok(created) => Ok(created.clone()),
            Err(rejected) => Err(ValidationError::Duplicate {
                field: "raw material id".to_string(),
                value: rejected.id,
            }
            .into()),
        }
    }

    pub fn update(&mut self, id: &str, patch: RawMaterialPatch) -> CoreResult<RawMaterial> {
        let current = self
            .materials
            .get(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::RawMaterial, id))?;

        let mut merged = current.clone();
        if let Some(name) = patch.name {
            merged.name = name.trim().to_string();
        }
        if let Some(unit) = patch.unit {
            merged.unit = unit.trim().to_string();
        }
        if let Some(stock) = patch.stock {
            merged.stock = stock;
        }
        if let Some(unit_cost) = patch.unit_cost {
            merged.unit_cost = unit_cost;
        }
        if let Some(supplier) = patch.supplier {
            merged.supplier = supplier.trim().to_string();
        }
        validate_raw_material(&merged)?;
        merged.touch(Utc::now());

        let slot = self
            .materials
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::RawMaterial, id))?;
        *slot = merged.clone();
        Ok(merged)
    }

    /// Removes a raw material. Callers check BOM usage first.
    pub fn delete(&mut self, id: &str) -> CoreResult<RawMaterial> {
        self.materials
            .remove(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::RawMaterial, id))
    }

    /// Consumes `qty` units of the material.
    pub fn decrement_stock(&mut self, id: &str, qty: Decimal) -> CoreResult<()> {
        validate_positive_amount("quantity", qty)?;
        let material = self
            .materials
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::RawMaterial, id))?;

        if qty > material.stock {
            return Err(CoreError::InsufficientStock {
                entity: EntityKind::RawMaterial,
                id: id.to_string(),
                requested: qty,
                available: material.stock,
            });
        }

        material.stock -= qty;
        material.touch(Utc::now());
        Ok(())
    }

    /// Receives `qty` units. A given unit cost replaces the current one.
    pub fn increment_stock(
        &mut self,
        id: &str,
        qty: Decimal,
        new_unit_cost: Option<Money>,
    ) -> CoreResult<()> {
        validate_positive_amount("quantity", qty)?;
        if let Some(cost) = new_unit_cost {
            validate_positive_money("unitCost", cost)?;
        }
        let material = self
            .materials
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::RawMaterial, id))?;

        material.stock = checked_sum("stock", material.stock, qty)?;
        if let Some(cost) = new_unit_cost {
            material.unit_cost = cost;
        }
        material.touch(Utc::now());
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get(&self, id: &str) -> Option<&RawMaterial> {
        self.materials.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.materials.contains(id)
    }

    pub fn list(&self) -> &[RawMaterial] {
        self.materials.as_slice()
    }

    /// Case-insensitive match on name or supplier.
    pub fn search(&self, query: &str) -> CoreResult<Vec<&RawMaterial>> {
        let query = normalize_search_query(query)?;
        Ok(self
            .materials
            .iter()
            .filter(|m| {
                query.is_empty()
                    || m.name.to_lowercase().contains(&query)
                    || m.supplier.to_lowercase().contains(&query)
            })
            .collect())
    }

    /// Materials whose stock is strictly below `threshold`.
    pub fn low_stock(&self, threshold: Decimal) -> Vec<&RawMaterial> {
        self.materials
            .iter()
            .filter(|m| m.stock < threshold)
            .collect()
    }

    /// Value of everything on hand: Σ stock × unitCost.
    pub fn inventory_value(&self) -> Money {
        self.materials.iter().map(RawMaterial::stock_value).sum()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl<'de> Deserialize<'de> for MaterialStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let materials = Vec::<RawMaterial>::deserialize(deserializer)?;
        MaterialStore::from_records(materials).map_err(de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn beans() -> NewRawMaterial {
        NewRawMaterial {
            name: "Coffee Beans".to_string(),
            unit: "g".to_string(),
            stock: dec!(5000),
            unit_cost: Money::new(dec!(0.05)),
            supplier: "Coffee Supplier Inc.".to_string(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let mut store = MaterialStore::new();
        let created = store.create(beans()).unwrap();
        assert_eq!(store.get(&created.id).map(|m| m.stock), Some(dec!(5000)));
    }

    #[test]
    fn test_create_requires_supplier_and_cost() {
        let mut store = MaterialStore::new();

        let mut input = beans();
        input.supplier = " ".to_string();
        assert!(store.create(input).is_err());

        let mut input = beans();
        input.unit_cost = Money::zero();
        assert!(store.create(input).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_increment_overwrites_unit_cost() {
        let mut store = MaterialStore::new();
        let id = store.create(beans()).unwrap().id;

        store
            .increment_stock(&id, dec!(2000), Some(Money::new(dec!(0.06))))
            .unwrap();
        let m = store.get(&id).unwrap();
        assert_eq!(m.stock, dec!(7000));
        assert_eq!(m.unit_cost, Money::new(dec!(0.06)));

        store.increment_stock(&id, dec!(500), None).unwrap();
        let m = store.get(&id).unwrap();
        assert_eq!(m.stock, dec!(7500));
        assert_eq!(m.unit_cost, Money::new(dec!(0.06)));
    }

    #[test]
    fn test_decrement_never_goes_negative() {
        let mut store = MaterialStore::new();
        let id = store.create(beans()).unwrap().id;

        store.decrement_stock(&id, dec!(4999.5)).unwrap();
        assert_eq!(store.get(&id).map(|m| m.stock), Some(dec!(0.5)));

        let err = store.decrement_stock(&id, dec!(1)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { entity: EntityKind::RawMaterial, .. }
        ));
        assert_eq!(store.get(&id).map(|m| m.stock), Some(dec!(0.5)));
    }

    #[test]
    fn test_unknown_material() {
        let mut store = MaterialStore::new();
        assert!(matches!(
            store.increment_stock("9", dec!(1), None),
            Err(CoreError::NotFound { entity: EntityKind::RawMaterial, .. })
        ));
    }

    #[test]
    fn test_search_low_stock_and_value() {
        let mut store = MaterialStore::new();
        store.create(beans()).unwrap();
        store
            .create(NewRawMaterial {
                name: "Milk".to_string(),
                unit: "ml".to_string(),
                stock: dec!(300),
                unit_cost: Money::new(dec!(0.003)),
                supplier: "Dairy Farm Inc.".to_string(),
            })
            .unwrap();

        assert_eq!(store.search("dairy").unwrap().len(), 1);
        assert_eq!(store.search("BEANS").unwrap().len(), 1);
        assert_eq!(store.low_stock(dec!(500)).len(), 1);
        // 5000 × 0.05 + 300 × 0.003
        assert_eq!(store.inventory_value(), Money::new(dec!(250.9)));
    }

    #[test]
    fn test_increment_past_decimal_range_is_refused() {
        let mut store = MaterialStore::new();
        let id = store.create(beans()).unwrap().id;

        let err = store
            .increment_stock(&id, Decimal::MAX, Some(Money::new(dec!(0.07))))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
        let m = store.get(&id).unwrap();
        assert_eq!(m.stock, dec!(5000));
        assert_eq!(m.unit_cost, Money::new(dec!(0.05)));
    }

    #[test]
    fn test_loading_rejects_zero_unit_cost() {
        let mut store = MaterialStore::new();
        store.create(beans()).unwrap();
        let json = serde_json::to_string(&store)
            .unwrap()
            .replace("\"0.05\"", "\"0\"");

        let err = serde_json::from_str::<MaterialStore>(&json).unwrap_err();
        assert!(err.to_string().contains("unitCost must be greater than 0"));
    }
}
