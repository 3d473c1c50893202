//! # Record Collection
//!
//! Id-indexed storage shared by the catalog and material stores.
//!
//! ## Arena + Index
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  records: Vec<T>   (insertion order, the persisted order)              │
//! │  ┌──────────┬──────────┬──────────┬──────────┐                         │
//! │  │ slot 0   │ slot 1   │ slot 2   │ slot 3   │                         │
//! │  │ id "1"   │ id "2"   │ id "7f…" │ id "9c…" │                         │
//! │  └──────────┴──────────┴──────────┴──────────┘                         │
//! │        ▲          ▲          ▲          ▲                              │
//! │  index: HashMap<id, slot>                                              │
//! │  { "1" → 0, "2" → 1, "7f…" → 2, "9c…" → 3 }                            │
//! │                                                                         │
//! │  Product.ingredients hold ids, never references: a BOM entry is        │
//! │  resolved with one index lookup, and a missing id is an explicit       │
//! │  `None` rather than a dangling pointer.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Serializes as a plain JSON array in insertion order, so
//! save → load → save produces identical bytes.

use std::collections::HashMap;

use serde::de::{self, Deserialize, DeserializeOwned, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::types::Record;

/// An insertion-ordered set of records addressable by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    records: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Record> Collection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection, rejecting duplicate ids.
    ///
    /// ## Returns
    /// * `Err(id)` - the first id that appears twice
    pub fn from_records(records: Vec<T>) -> Result<Self, String> {
        let mut index = HashMap::with_capacity(records.len());
        for (slot, record) in records.iter().enumerate() {
            if index.insert(record.id().to_string(), slot).is_some() {
                return Err(record.id().to_string());
            }
        }
        Ok(Collection { records, index })
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&slot| &self.records[slot])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        match self.index.get(id) {
            Some(&slot) => Some(&mut self.records[slot]),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Appends a record. Returns the record back if its id is already taken.
    pub fn insert(&mut self, record: T) -> Result<&T, T> {
        if self.index.contains_key(record.id()) {
            return Err(record);
        }
        let slot = self.records.len();
        self.index.insert(record.id().to_string(), slot);
        self.records.push(record);
        Ok(&self.records[slot])
    }

    /// Removes a record, keeping the order of the remaining ones.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let slot = self.index.remove(id)?;
        let removed = self.records.remove(slot);
        // Slots after the removed one shift down by one.
        for s in self.index.values_mut() {
            if *s > slot {
                *s -= 1;
            }
        }
        Some(removed)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<T: Serialize> Serialize for Collection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

impl<'de, T: Record + DeserializeOwned> Deserialize<'de> for Collection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<T>::deserialize(deserializer)?;
        Collection::from_records(records)
            .map_err(|id| de::Error::custom(format!("duplicate record id: {}", id)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
