//! Database connection management.
//!
//! Provides a `StorePool` wrapper around `SQLx` that handles connection
//! options and pooling for the scan store.

use crate::error::{Result, StoreError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// `SQLite` connection pool for the scan store.
#[derive(Debug)]
pub struct StorePool {
    pool: Pool<Sqlite>,
}

impl StorePool {
    /// Create a new connection pool.
    ///
    /// # Arguments
    /// * `path` - Path to the `SQLite` database file (or `:memory:` for in-memory)
    ///
    /// # Errors
    /// Returns `StoreError::Open` if the database cannot be opened or created.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path
            .as_ref()
            .to_str()
            .ok_or_else(|| StoreError::Open("invalid database path: not valid UTF-8".to_string()))?;

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| StoreError::Open(format!("invalid connection string: {e}")))?
            .foreign_keys(true)
            .create_if_missing(true);

        // An in-memory SQLite database exists per connection, so a multi-
        // connection pool would see empty databases on all but one of them.
        let max_connections = if path_str.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::Open(format!("failed to initialize pool: {e}")))?;

        tracing::info!("Scan store pool created at {}", path_str);

        Ok(Self { pool })
    }

    /// Get a reference to the underlying `SQLx` pool.
    ///
    /// This allows consumers to execute queries directly using `SQLx`.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Scan store pool closed");
    }

    /// Verify that the database is reachable.
    ///
    /// # Errors
    /// Returns `StoreError::Open` if a trivial query fails.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Open(format!("store unreachable: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_creation() {
        let pool = StorePool::new(":memory:").await.expect("create pool");
        pool.ping().await.expect("ping store");
    }

    #[tokio::test]
    async fn test_pool_close() {
        let pool = StorePool::new(":memory:").await.expect("create pool");
        pool.close().await; // Should not panic
    }

    #[tokio::test]
    async fn test_file_backed_pool() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("webscope.db");
        let pool = StorePool::new(&path).await.expect("create file pool");
        pool.ping().await.expect("ping store");
        assert!(path.exists());
    }
}
