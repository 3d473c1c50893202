//! # Ledgers
//!
//! Append-only storage for records that are never edited once written:
//! completed sales ([`Transaction`]) and received stock ([`Purchase`]).
//!
//! A ledger has no update or delete. The only way in is [`Ledger::append`].

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Purchase, Record, Transaction};

/// A record that can live in a [`Ledger`].
pub trait LedgerEntry: Record {
    /// Business date of the entry (sale time, delivery date).
    fn date(&self) -> DateTime<Utc>;
}

impl LedgerEntry for Transaction {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

impl LedgerEntry for Purchase {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// An append-only, id-indexed list of entries in the order they were written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: LedgerEntry + DeserializeOwned"
))]
pub struct Ledger<T> {
    entries: Collection<T>,
}

/// Completed sales.
pub type TransactionLedger = Ledger<Transaction>;

/// Received raw-material deliveries. See [`crate::purchase`] for `record`.
pub type PurchaseLedger = Ledger<Purchase>;

impl<T> Default for Ledger<T> {
    fn default() -> Self {
        Ledger {
            entries: Collection::default(),
        }
    }
}

impl<T: LedgerEntry + Clone> Ledger<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from existing entries (loaded or seeded).
    pub fn from_records(entries: Vec<T>) -> CoreResult<Self> {
        let entries = Collection::from_records(entries).map_err(|id| ValidationError::Duplicate {
            field: "ledger entry id".to_string(),
            value: id,
        })?;
        Ok(Ledger { entries })
    }

    /// Appends an entry. Ids are unique within a ledger.
    pub fn append(&mut self, entry: T) -> CoreResult<&T> {
        self.entries.insert(entry).map_err(|rejected| {
            ValidationError::Duplicate {
                field: "ledger entry id".to_string(),
                value: rejected.id().to_string(),
            }
            .into()
        })
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    /// All entries, oldest write first.
    pub fn list(&self) -> &[T] {
        self.entries.as_slice()
    }

    /// Entries whose business date falls in `[start, end]`, both ends included.
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&T> {
        self.entries
            .iter()
            .filter(|e| e.date() >= start && e.date() <= end)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Ledger<Transaction> {
    /// Revenue (Σ total) of every recorded sale.
    pub fn revenue(&self) -> Money {
        self.entries.iter().map(|t| t.total).sum()
    }

    /// Profit (Σ profit) of every recorded sale.
    pub fn profit(&self) -> Money {
        self.entries.iter().map(|t| t.profit).sum()
    }
}
