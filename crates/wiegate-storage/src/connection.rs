use crate::adapter::{PersistenceAdapter, Staging};
use crate::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Location of the SQLite database file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Whether to create the database file if it doesn't exist
    pub create_if_missing: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_path: "wiegate.db".to_string(),
            create_if_missing: true,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration with the given path
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }

    /// Set whether to create the database if it doesn't exist
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }
}

/// SQLite-backed [`PersistenceAdapter`].
///
/// Values live in the `kv_store` table keyed by `(namespace, key)`. Staged
/// writes are held in memory and applied in a single transaction on commit.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    staging: Arc<Mutex<Staging>>,
}

impl SqliteStore {
    /// Open (and migrate) the database described by `config`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use wiegate_storage::connection::{DatabaseConfig, SqliteStore};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = DatabaseConfig::new("wiegate.db").create_if_missing(false);
    ///
    /// let store = SqliteStore::new(config).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: DatabaseConfig) -> StorageResult<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Configuration(format!("Failed to create database directory: {}", e))
            })?;
        }

        // Committed values must survive power loss, hence FULL sync
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.database_path))
            .map_err(|e| StorageError::Configuration(format!("Invalid database path: {}", e)))?
            .create_if_missing(config.create_if_missing)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Full)
            .busy_timeout(Duration::from_secs(10))
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool);
        store.migrate().await?;

        debug!(path = %config.database_path, "SQLite store opened");
        Ok(store)
    }

    /// Create an in-memory database (primarily for testing)
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // The database lives as long as its single connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool);
        store.migrate().await?;

        Ok(store)
    }

    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            staging: Arc::new(Mutex::new(Staging::default())),
        }
    }

    /// Run database migrations
    ///
    /// The migration directory is embedded at compile time by
    /// `sqlx::migrate!`.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

impl PersistenceAdapter for SqliteStore {
    async fn put(&self, namespace: &str, key: &str, value: &[u8]) -> StorageResult<()> {
        self.staging.lock().await.put(namespace, key, value);
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        if let Some(value) = self.staging.lock().await.get(namespace, key) {
            return Ok(Some(value.clone()));
        }

        let value: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT value FROM kv_store WHERE namespace = ? AND key = ?")
                .bind(namespace)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    async fn commit(&self, namespace: &str) -> StorageResult<()> {
        let staged = self.staging.lock().await.take(namespace);
        if staged.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for (key, value) in &staged {
            sqlx::query(
                r#"
                INSERT INTO kv_store (namespace, key, value, updated_at)
                VALUES (?, ?, ?, datetime('now'))
                ON CONFLICT (namespace, key)
                DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
            )
            .bind(namespace)
            .bind(key)
            .bind(value.as_slice())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!(namespace, keys = staged.len(), "Namespace committed");
        Ok(())
    }
}
