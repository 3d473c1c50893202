//! # Storage Commands
//!
//! Reports and clears changes that are live but not yet saved, left behind
//! when a save fails after a change was applied.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::Shop;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatus {
    /// Storage keys of the collections waiting to be saved
    pub pending: Vec<String>,
    pub saved: bool,
}

pub async fn storage_status(shop: &Shop) -> StorageStatus {
    debug!("storage_status command");

    let pending: Vec<String> = shop
        .pending()
        .await
        .into_iter()
        .map(|name| name.key().to_string())
        .collect();
    StorageStatus {
        saved: pending.is_empty(),
        pending,
    }
}

/// Saves every pending collection.
pub async fn flush_changes(shop: &Shop) -> Result<StorageStatus, ApiError> {
    debug!("flush_changes command");

    let written = shop.flush().await?;
    if written > 0 {
        info!(collections = written, "Pending changes reconciled");
    }
    Ok(storage_status(shop).await)
}
