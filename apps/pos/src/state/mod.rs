//! # State Module
//!
//! Application state shared by the command functions.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────┐  ┌──────────────────┐          │
//! │  │      Shop        │  │  CartState   │  │   ConfigState    │          │
//! │  │                  │  │              │  │                  │          │
//! │  │  RwLock<Arc<     │  │  Arc<Mutex<  │  │  thresholds      │          │
//! │  │    Inventory>>   │  │    Cart      │  │  save_attempts   │          │
//! │  │  Mutex<Pending>  │  │  >>          │  │  db_path         │          │
//! │  │  CollectionStore │  │              │  │                  │          │
//! │  └──────────────────┘  └──────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Shop: readers clone the published Arc, writers queue on the gate    │
//! │  • CartState: std Mutex, never held across an .await                   │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod shop;

pub use cart::CartState;
pub use config::ConfigState;
pub use shop::Shop;
