//! WebScope Store - Append-only persistence for targets and scans.
//!
//! Provides `SQLite` access via `SQLx` with embedded migrations. Targets are
//! named scan subjects; scans are immutable extraction snapshots saved
//! against a target. Deleting a target cascades to its scans inside one
//! transaction, so no orphan scan can reference a missing target.
//!
//! # Example
//!
//! ```ignore
//! use webscope_db::Store;
//!
//! let store = Store::open("webscope.db").await?;
//! store.run_migrations().await?;
//!
//! let target = store.create_target("staging", Some("pre-prod")).await?;
//! let scan_id = store.save_scan(target.id, &record).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod migrations;
pub mod scans;
pub mod settings;
pub mod targets;

// Re-export commonly used types
pub use connection::StorePool;
pub use error::{Result, StoreError};
pub use scans::Scan;
pub use targets::Target;

use std::path::Path;
use webscope_core::ScanRecord;

/// High-level store interface wrapping the pool and the per-entity modules.
#[derive(Debug)]
pub struct Store {
    pool: StorePool,
}

impl Store {
    /// Open (or create) the store at the given path.
    ///
    /// # Errors
    /// Returns `StoreError::Open` if the database cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let pool = StorePool::new(path).await?;
        Ok(Self { pool })
    }

    /// Run all pending migrations.
    ///
    /// # Errors
    /// Returns `StoreError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(self.pool.pool()).await
    }

    /// Get the current schema version (number of applied migrations).
    pub async fn schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(self.pool.pool()).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        self.pool.pool()
    }

    /// Close the store gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Create a new target. See [`targets::create_target`].
    pub async fn create_target(&self, name: &str, description: Option<&str>) -> Result<Target> {
        targets::create_target(self.pool(), name, description).await
    }

    /// List all targets. See [`targets::list_targets`].
    pub async fn list_targets(&self) -> Result<Vec<Target>> {
        targets::list_targets(self.pool()).await
    }

    /// Delete a target and cascade to its scans. See [`targets::delete_target`].
    pub async fn delete_target(&self, id: i64) -> Result<()> {
        targets::delete_target(self.pool(), id).await
    }

    /// Save a scan against a target. See [`scans::save_scan`].
    pub async fn save_scan(&self, target_id: i64, record: &ScanRecord) -> Result<i64> {
        scans::save_scan(self.pool(), target_id, record).await
    }

    /// Get all scans for a target. See [`scans::scans_by_target`].
    pub async fn scans_by_target(&self, target_id: i64) -> Result<Vec<Scan>> {
        scans::scans_by_target(self.pool(), target_id).await
    }

    /// Bulk-delete scans by id. See [`scans::delete_scans`].
    pub async fn delete_scans(&self, ids: &[i64]) -> Result<()> {
        scans::delete_scans(self.pool(), ids).await
    }

    /// Substring search over a target's scans. See [`scans::search_scans`].
    pub async fn search_scans(&self, target_id: i64, query: &str) -> Result<Vec<Scan>> {
        scans::search_scans(self.pool(), target_id, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use webscope_core::ExtractionPayload;

    async fn create_test_store() -> Store {
        let store = Store::open(":memory:").await.expect("open store");
        store.run_migrations().await.expect("run migrations");
        store
    }

    #[tokio::test]
    async fn test_store_creation() {
        let store = Store::open(":memory:").await.expect("open store");

        let version_before = store.schema_version().await.expect("get version");
        assert_eq!(version_before, 0);

        store.run_migrations().await.expect("run migrations");

        let version_after = store.schema_version().await.expect("get version");
        assert_eq!(version_after, 1);
    }

    #[tokio::test]
    async fn test_store_schema() {
        let store = create_test_store().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name"
        )
        .fetch_all(store.pool())
        .await
        .expect("query tables");

        assert_eq!(tables, vec!["scans", "settings", "targets"]);

        let scan_columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('scans') ORDER BY cid")
                .fetch_all(store.pool())
                .await
                .expect("query columns");

        assert_eq!(
            scan_columns,
            vec!["id", "target_id", "url", "timestamp", "data"]
        );
    }

    #[tokio::test]
    async fn test_store_facade_round_trip() {
        let store = create_test_store().await;

        let target = store
            .create_target("example", Some("facade test"))
            .await
            .expect("create target");

        let record = ScanRecord {
            url: "https://example.com/".to_string(),
            timestamp: Utc::now(),
            payload: ExtractionPayload::default(),
        };

        let scan_id = store.save_scan(target.id, &record).await.expect("save scan");
        let scans = store.scans_by_target(target.id).await.expect("list scans");
        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].id, scan_id);
        assert_eq!(scans[0].data, record);

        store.delete_target(target.id).await.expect("delete target");
        let scans = store.scans_by_target(target.id).await.expect("list scans");
        assert!(scans.is_empty());
    }

    #[tokio::test]
    async fn test_store_close() {
        let store = Store::open(":memory:").await.expect("open store");
        store.close().await; // Should not panic
    }
}
