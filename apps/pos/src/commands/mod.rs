//! # Commands Module
//!
//! Every operation exposed to the POS screen.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── catalog.rs    ◄─── Product search, CRUD, restock
//! ├── inventory.rs  ◄─── Raw materials, stock value, low-stock lists
//! ├── cart.rs       ◄─── Cart manipulation
//! ├── sale.rs       ◄─── Checkout and transaction history
//! ├── purchase.rs   ◄─── Supplier deliveries
//! ├── storage.rs    ◄─── Unsaved-change status and flush
//! └── config.rs     ◄─── Configuration retrieval
//! ```
//!
//! ## Shape of a Command
//! Each command takes only the state it needs and returns a serializable
//! DTO or an [`ApiError`](crate::error::ApiError):
//!
//! ```rust,ignore
//! // Only needs the shop
//! async fn search_products(shop: &Shop, config: &ConfigState, query: &str, ...)
//!
//! // Only needs the cart
//! fn get_cart(cart: &CartState) -> CartResponse
//!
//! // Needs both
//! async fn add_to_cart(shop: &Shop, cart: &CartState, product_id: &str, ...)
//! ```

pub mod cart;
pub mod catalog;
pub mod config;
pub mod inventory;
pub mod purchase;
pub mod sale;
pub mod storage;
