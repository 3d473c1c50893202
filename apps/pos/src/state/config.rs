//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`BARISTA_*`)
//! 2. Defaults (this file)
//!
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;
use std::str::FromStr;

use barista_core::Money;
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Store name (shown on the POS screen)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Explicit database file. `None` means the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Products with fewer units than this are reported as low stock.
    pub low_stock_threshold: i64,

    /// Raw materials below this quantity are reported as low stock.
    pub material_low_stock: Decimal,

    /// How many times a failed save is attempted before giving up.
    pub save_attempts: u32,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            store_name: "Barista Coffee Bar".to_string(),
            currency_symbol: "$".to_string(),
            db_path: None,
            low_stock_threshold: 10,
            material_low_stock: Decimal::from(500),
            save_attempts: 3,
        }
    }
}

impl ConfigState {
    /// Creates a ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `BARISTA_STORE_NAME`: Override store name
    /// - `BARISTA_DB_PATH`: Database file path
    /// - `BARISTA_LOW_STOCK_THRESHOLD`: Product low-stock threshold (units)
    /// - `BARISTA_MATERIAL_LOW_STOCK`: Raw material low-stock threshold
    /// - `BARISTA_SAVE_ATTEMPTS`: Save attempts per change (at least 1)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ConfigState::default();

        if let Some(store_name) = lookup("BARISTA_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(path) = lookup("BARISTA_DB_PATH") {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(threshold) = parse(&lookup, "BARISTA_LOW_STOCK_THRESHOLD") {
            config.low_stock_threshold = threshold;
        }

        if let Some(threshold) = parse(&lookup, "BARISTA_MATERIAL_LOW_STOCK") {
            config.material_low_stock = threshold;
        }

        if let Some(attempts) = parse::<u32>(&lookup, "BARISTA_SAVE_ATTEMPTS") {
            config.save_attempts = attempts.max(1);
        }

        config
    }

    /// Resolves the database file, creating the data directory if needed.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.barista.pos/barista.db`
    /// - **Windows**: `%APPDATA%\barista\pos\data\barista.db`
    /// - **Linux**: `~/.local/share/pos/barista.db`
    pub fn database_path(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let proj_dirs = ProjectDirs::from("com", "barista", "pos")
            .ok_or("Could not determine app data directory")?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join("barista.db"))
    }

    /// Formats an amount as a currency string, rounded to cents.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let rounded = amount.round_to_cents().amount();
        format!(
            "{}{}{:.2}",
            if rounded.is_sign_negative() && !rounded.is_zero() {
                "-"
            } else {
                ""
            },
            self.currency_symbol,
            rounded.abs()
        )
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}
