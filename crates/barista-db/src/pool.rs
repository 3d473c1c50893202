//! # Store Database
//!
//! Opens the SQLite file that holds the four store collections.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new("barista.db")          DbConfig::in_memory()             │
//! │       │  WAL, busy wait, pooled            │  one connection, pinned    │
//! │       └──────────────┬─────────────────────┘                            │
//! │                      ▼                                                  │
//! │          Database::new(config).await                                    │
//! │                      │  open pool, apply migrations                     │
//! │                      ▼                                                  │
//! │          impl CollectionStore ──► load(name) / save(batch)              │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │          db.close().await          (on shutdown)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The shop saves from one writer at a time, but the seed binary or a second
//! process may hold the file. `busy_timeout` makes a save wait for the lock
//! instead of failing straight away with `database is locked`.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::collections::{CollectionName, CollectionRepository, CollectionStore};

// =============================================================================
// Configuration
// =============================================================================

/// Where the store lives and how the pool behaves.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/barista/barista.db")
///     .max_connections(2)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Store file, created on first open.
    pub database_path: PathBuf,

    /// Pool size. Readers load on startup only, so a handful is plenty.
    pub max_connections: u32,

    pub min_connections: u32,

    /// How long to wait for a free pooled connection.
    pub acquire_timeout: Duration,

    /// How long SQLite waits on a locked file before giving up.
    pub busy_timeout: Duration,

    /// Idle connections are closed after this long. `None` keeps them.
    pub idle_timeout: Option<Duration>,

    pub run_migrations: bool,

    in_memory: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
            in_memory: false,
        }
    }

    /// A private, empty store that disappears with the pool.
    ///
    /// The data lives in the single connection, so the pool is pinned to
    /// exactly one connection that is never closed for idleness or age.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::ZERO,
            idle_timeout: None,
            run_migrations: true,
            in_memory: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Skip migrations on open (the schema is managed elsewhere).
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        if self.in_memory {
            return SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()));
        }

        Ok(SqliteConnectOptions::new()
            .filename(&self.database_path)
            .create_if_missing(true)
            // A crash mid-save keeps the previous committed value of every key.
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout);

        if self.in_memory {
            options.max_lifetime(None)
        } else {
            options
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the store database. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            in_memory = config.in_memory,
            "Opening store database"
        );

        let pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(
            max_connections = config.max_connections,
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "Store pool ready"
        );

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn collections(&self) -> CollectionRepository {
        CollectionRepository::new(self.pool.clone())
    }

    /// Waits for in-flight queries, then closes every connection.
    /// Later loads and saves fail with a connection error.
    pub async fn close(&self) {
        info!("Closing store database");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl CollectionStore for Database {
    async fn load(&self, name: CollectionName) -> DbResult<Option<String>> {
        self.collections().load(name).await
    }

    async fn save(&self, batch: &[(CollectionName, String)]) -> DbResult<()> {
        self.collections().save_batch(batch).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_applies_migrations() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert!(total >= 1);
    }

    #[tokio::test]
    async fn test_in_memory_stores_are_isolated() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = Database::new(DbConfig::in_memory()).await.unwrap();

        a.save(&[(CollectionName::Products, "[]".to_string())])
            .await
            .unwrap();
        assert!(b.load(CollectionName::Products).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_one_store() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = a.clone();

        a.save(&[(CollectionName::Purchases, "[]".to_string())])
            .await
            .unwrap();
        assert_eq!(
            b.load(CollectionName::Purchases).await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_closed_store_rejects_io() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
        assert!(db.load(CollectionName::Products).await.is_err());
    }

    #[test]
    fn test_config_defaults_and_builder() {
        let memory = DbConfig::in_memory();
        assert!(memory.is_in_memory());
        assert_eq!(memory.max_connections, 1);
        assert_eq!(memory.idle_timeout, None);

        let file = DbConfig::new("/tmp/barista.db")
            .max_connections(2)
            .busy_timeout(Duration::from_millis(250))
            .run_migrations(false);
        assert!(!file.is_in_memory());
        assert_eq!(file.max_connections, 2);
        assert_eq!(file.busy_timeout, Duration::from_millis(250));
        assert!(!file.run_migrations);
    }
}
