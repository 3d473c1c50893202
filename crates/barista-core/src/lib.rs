//! # barista-core: Pure Business Logic for Barista POS
//!
//! This crate is the **heart** of Barista POS. It holds the stores, the
//! ledgers and the settlement engine as plain values with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Barista POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    POS Screen                                   │   │
//! │  │    Products ──► Cart ──► Payment ──► Receipt                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    barista-pos (Shop)                           │   │
//! │  │    snapshot publish, writer gate, flush-on-mutate               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ barista-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │  catalog  │  │ materials │  │   cart    │  │settlement │   │   │
//! │  │   │  Product  │  │RawMaterial│  │ CartItem  │  │ plan/apply│   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │  ledger   │  │ purchase  │  │   money   │  │ validation│   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOCKS                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    barista-db (Database Layer)                  │   │
//! │  │           SQLite, migrations, collection repository             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, RawMaterial, Purchase, Transaction)
//! - [`money`] - Exact decimal money
//! - [`collection`] - Id-indexed record storage
//! - [`catalog`] / [`materials`] - The two stock-bearing stores
//! - [`ledger`] / [`purchase`] - Append-only history and stock receipts
//! - [`cart`] / [`settlement`] - The sale in progress and its checkout
//! - [`inventory`] - All of the above as one value
//! - [`seed`] - The default dataset
//!
//! ## Example Usage
//!
//! ```rust
//! use barista_core::{Cart, Inventory, Money, PaymentDetails, PaymentMethod};
//!
//! let mut inventory = Inventory::seeded().unwrap();
//! let espresso = inventory.catalog().get("1").unwrap().clone();
//!
//! let mut cart = Cart::new();
//! cart.add_item(&espresso, 2).unwrap();
//!
//! let payment = PaymentDetails {
//!     discount: Money::zero(),
//!     tax: Money::from_cents(50),
//!     payment_method: PaymentMethod::Cash,
//!     cashier_name: "John Doe".to_string(),
//!     customer_name: None,
//!     notes: None,
//! };
//! let sale = inventory.checkout(&cart, payment).unwrap();
//!
//! assert_eq!(sale.total, Money::from_cents(750));
//! assert_eq!(inventory.catalog().get("1").unwrap().stock, 98);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod collection;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod materials;
pub mod money;
pub mod purchase;
pub mod seed;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartTotals};
pub use catalog::CatalogStore;
pub use collection::Collection;
pub use error::{CoreError, CoreResult, EntityKind, ValidationError};
pub use inventory::Inventory;
pub use ledger::{Ledger, LedgerEntry, PurchaseLedger, TransactionLedger};
pub use materials::MaterialStore;
pub use money::Money;
pub use purchase::{PurchaseItemInput, PurchaseOrder};
pub use settlement::{PaymentDetails, SettlementPlan};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line
///
/// ## Business Reason
/// Catches typing 1000 instead of 10 at the register.
pub const MAX_ITEM_QUANTITY: i64 = 999;
