//! # barista-db: Database Layer for Barista POS
//!
//! Persists the store state in SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Barista POS Data Flow                             │
//! │                                                                         │
//! │  Shop mutation (checkout, record_purchase, CRUD)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     barista-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ (collections)  │    │  (embedded)  │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │            ▲                                                    │   │
//! │  │   ┌────────┴──────┐                                             │   │
//! │  │   │   snapshot    │  Inventory ⇄ JSON arrays, seed-if-absent    │   │
//! │  │   └───────────────┘                                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   collections(key, value, updated_at)                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - The collection repository and `CollectionStore` trait
//! - [`snapshot`] - Loading, seeding and encoding an `Inventory`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use barista_db::{load_inventory, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("barista.db")).await?;
//! let loaded = load_inventory(&db).await?;
//! println!("{} products", loaded.inventory.catalog().len());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::collections::{CollectionName, CollectionRepository, CollectionStore};
pub use snapshot::{encode, encode_batch, load_inventory, LoadedInventory};
