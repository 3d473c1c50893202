//! # Collection Repository
//!
//! Key-value storage of whole collections: one row per collection name,
//! holding the JSON array of its records.
//!
//! ## Save Path
//! ```text
//! save_batch([(products, "[...]"), (rawMaterials, "[...]"), (transactions, "[...]")])
//!      │
//!      ▼
//! BEGIN
//!   UPSERT collections(key, value, updated_at)   × N
//! COMMIT            ◄── all keys land together or none do
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::fmt;
use tracing::debug;

use crate::error::{DbError, DbResult};

// =============================================================================
// Collection Names
// =============================================================================

/// The persisted collections and their storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionName {
    Products,
    RawMaterials,
    Purchases,
    Transactions,
}

impl CollectionName {
    /// Every collection, in load order.
    pub const ALL: [CollectionName; 4] = [
        CollectionName::Products,
        CollectionName::RawMaterials,
        CollectionName::Purchases,
        CollectionName::Transactions,
    ];

    /// Storage key of the collection.
    pub fn key(&self) -> &'static str {
        match self {
            CollectionName::Products => "products",
            CollectionName::RawMaterials => "rawMaterials",
            CollectionName::Purchases => "purchases",
            CollectionName::Transactions => "transactions",
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// Persistence Trait
// =============================================================================

/// Durable storage of named collections.
///
/// Implemented by [`crate::Database`]. The application layer holds it as
/// `Arc<dyn CollectionStore>` so other backends can stand in.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Returns the stored JSON, or `None` if the collection was never saved.
    async fn load(&self, name: CollectionName) -> DbResult<Option<String>>;

    /// Saves every entry atomically: either all keys are written or none.
    async fn save(&self, batch: &[(CollectionName, String)]) -> DbResult<()>;
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the `collections` table.
#[derive(Debug, Clone)]
pub struct CollectionRepository {
    pool: SqlitePool,
}

impl CollectionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CollectionRepository { pool }
    }

    /// Loads the raw JSON of one collection.
    pub async fn load(&self, name: CollectionName) -> DbResult<Option<String>> {
        debug!(collection = %name, "Loading collection");

        let value: Option<String> = sqlx::query_scalar("SELECT value FROM collections WHERE key = ?1")
            .bind(name.key())
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Writes every entry of `batch` in one SQL transaction.
    pub async fn save_batch(&self, batch: &[(CollectionName, String)]) -> DbResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(DbError::transaction)?;

        for (name, value) in batch {
            debug!(collection = %name, bytes = value.len(), "Saving collection");

            sqlx::query(
                r#"
                INSERT INTO collections (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT (key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(name.key())
            .bind(value)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(DbError::transaction)?;

        Ok(())
    }

    /// Keys currently stored, sorted.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM collections ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }

    /// Removes every stored collection. The next load seeds them again.
    pub async fn clear(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM collections")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn repo() -> CollectionRepository {
        Database::new(DbConfig::in_memory())
            .await
            .unwrap()
            .collections()
    }

    #[test]
    fn test_keys() {
        let keys: Vec<&str> = CollectionName::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["products", "rawMaterials", "purchases", "transactions"]);
    }

    #[tokio::test]
    async fn test_missing_collection_is_none() {
        let repo = repo().await;
        assert!(repo.load(CollectionName::Purchases).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_batch_and_overwrite() {
        let repo = repo().await;

        repo.save_batch(&[
            (CollectionName::Products, r#"[{"id":"1"}]"#.to_string()),
            (CollectionName::Transactions, "[]".to_string()),
        ])
        .await
        .unwrap();
        assert_eq!(
            repo.load(CollectionName::Products).await.unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );

        repo.save_batch(&[(CollectionName::Products, "[]".to_string())])
            .await
            .unwrap();
        assert_eq!(repo.load(CollectionName::Products).await.unwrap().as_deref(), Some("[]"));
        assert_eq!(repo.keys().await.unwrap(), vec!["products", "transactions"]);
    }

    #[tokio::test]
    async fn test_clear() {
        let repo = repo().await;
        repo.save_batch(&[(CollectionName::Purchases, "[]".to_string())])
            .await
            .unwrap();

        assert_eq!(repo.clear().await.unwrap(), 1);
        assert!(repo.keys().await.unwrap().is_empty());
    }
}
