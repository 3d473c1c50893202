//! # Repository Module
//!
//! Database repository implementations for Barista POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shop (apps/pos)                                                        │
//! │       │                                                                 │
//! │       │  store.save(&[(Products, json), (Transactions, json)])          │
//! │       ▼                                                                 │
//! │  CollectionStore (trait) ◄── implemented by Database                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CollectionRepository                                                  │
//! │  ├── load(&self, name)                                                 │
//! │  ├── save_batch(&self, batch)                                          │
//! │  ├── keys(&self)                                                       │
//! │  └── clear(&self)                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite `collections` table                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`collections::CollectionRepository`] - Named JSON collections

pub mod collections;
