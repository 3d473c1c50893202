//! # Barista POS Application Library
//!
//! The application layer between the POS screen and the business logic.
//!
//! ## Module Organization
//! ```text
//! barista_pos/
//! ├── lib.rs          ◄─── You are here (startup helpers)
//! ├── state/
//! │   ├── shop.rs     ◄─── Published inventory, writer gate, save loop
//! │   ├── cart.rs     ◄─── Session cart (Arc<Mutex<Cart>>)
//! │   └── config.rs   ◄─── Environment configuration
//! ├── commands/       ◄─── Functions called by the POS screen
//! └── error.rs        ◄─── ShopError and the serializable ApiError
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()          RUST_LOG or "info,barista=debug,sqlx=warn"  │
//! │  2. ConfigState::from_env() BARISTA_* variables                          │
//! │  3. open_shop(&config)                                                  │
//! │       • resolve the database file (BARISTA_DB_PATH or data dir)        │
//! │       • connect, WAL mode, run migrations                               │
//! │       • load collections, seed and save the absent ones                │
//! │  4. Hand Shop, CartState and ConfigState to the command layer          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::sync::Arc;

use barista_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use state::{ConfigState, Shop};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=barista=trace` - Show trace for barista crates only
/// - Default: INFO, DEBUG for barista crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,barista=debug,sqlx=warn"));

    // A subscriber may already be installed (tests, embedding hosts).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Opens the database named by `config` and loads the shop from it.
pub async fn open_shop(
    config: &ConfigState,
) -> Result<(Shop, Database), Box<dyn std::error::Error>> {
    let db_path = config.database_path()?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    let shop = Shop::open(Arc::new(db.clone()), config.save_attempts).await?;
    Ok((shop, db))
}
