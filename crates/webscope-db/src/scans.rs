//! Scan operations: immutable extraction snapshots saved against a target.
//!
//! Scans are append-only. There is no update path; deletion happens
//! individually, in bulk, or as part of a target's cascade.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use webscope_core::ScanRecord;

/// A persisted scan row with its decoded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    /// Store-assigned identifier.
    pub id: i64,
    /// The target this scan belongs to.
    pub target_id: i64,
    /// Page URL at capture time, `"unknown"` if unavailable.
    pub url: String,
    /// Capture time (RFC 3339).
    pub timestamp: String,
    /// The normalized extraction record.
    pub data: ScanRecord,
}

/// Save a scan against a target.
///
/// Verifies inside the same transaction that the target still exists, so a
/// concurrent target deletion cannot produce an orphaned scan.
///
/// # Errors
/// Returns `StoreError::Validation` if `target_id` does not reference an
/// existing target.
pub async fn save_scan(pool: &SqlitePool, target_id: i64, record: &ScanRecord) -> Result<i64> {
    let blob = serde_json::to_string(record)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    let url = if record.url.is_empty() {
        "unknown"
    } else {
        record.url.as_str()
    };

    let mut tx = pool.begin().await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM targets WHERE id = ?")
        .bind(target_id)
        .fetch_one(tx.as_mut())
        .await?
        > 0;
    if !exists {
        return Err(StoreError::Validation(format!(
            "target {target_id} not found"
        )));
    }

    let result =
        sqlx::query("INSERT INTO scans (target_id, url, timestamp, data) VALUES (?, ?, ?, ?)")
            .bind(target_id)
            .bind(url)
            .bind(record.timestamp.to_rfc3339())
            .bind(&blob)
            .execute(tx.as_mut())
            .await?;

    tx.commit().await?;

    let id = result.last_insert_rowid();
    tracing::info!("Saved scan {} for target {}", id, target_id);

    Ok(id)
}

/// Get all scans for a target, oldest first.
///
/// Returns an empty sequence when the target has no scans (or doesn't exist).
pub async fn scans_by_target(pool: &SqlitePool, target_id: i64) -> Result<Vec<Scan>> {
    let rows = sqlx::query(
        "SELECT id, target_id, url, timestamp, data FROM scans WHERE target_id = ? ORDER BY id",
    )
    .bind(target_id)
    .fetch_all(pool)
    .await?;

    let mut scans = Vec::with_capacity(rows.len());
    for row in rows {
        let blob: String = row.try_get("data")?;
        let data: ScanRecord = serde_json::from_str(&blob)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        scans.push(Scan {
            id: row.try_get("id")?,
            target_id: row.try_get("target_id")?,
            url: row.try_get("url")?,
            timestamp: row.try_get("timestamp")?,
            data,
        });
    }

    Ok(scans)
}

/// Delete a single scan. Missing ids are a no-op.
pub async fn delete_scan(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM scans WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Best-effort bulk delete in one transaction.
///
/// Missing ids are no-ops, not errors; all requested deletions commit
/// together so the caller never observes a half-applied batch.
pub async fn delete_scans(pool: &SqlitePool, ids: &[i64]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for id in ids {
        sqlx::query("DELETE FROM scans WHERE id = ?")
            .bind(id)
            .execute(tx.as_mut())
            .await?;
    }

    tx.commit().await?;
    tracing::info!("Deleted {} scans", ids.len());

    Ok(())
}

/// Case-insensitive substring search over a target's scans.
///
/// Matches against the scan URL or the full serialized payload. This is a
/// convenience filter applied client-side over the target's scan list, not
/// an indexed search; per-target scan volume is small.
pub async fn search_scans(pool: &SqlitePool, target_id: i64, query: &str) -> Result<Vec<Scan>> {
    let scans = scans_by_target(pool, target_id).await?;
    Ok(filter_scans(scans, query))
}

/// Apply the substring filter to an already-loaded scan list.
#[must_use]
pub fn filter_scans(scans: Vec<Scan>, query: &str) -> Vec<Scan> {
    if query.is_empty() {
        return scans;
    }
    let needle = query.to_lowercase();
    scans
        .into_iter()
        .filter(|scan| {
            if scan.url.to_lowercase().contains(&needle) {
                return true;
            }
            serde_json::to_string(&scan.data)
                .map(|blob| blob.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .collect()
}
