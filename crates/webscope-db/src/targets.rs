//! Target operations: named scan subjects that scans are grouped under.
//!
//! Targets are append-only apart from deletion, which cascades to every
//! scan referencing the target within a single transaction.

use crate::error::{Result, StoreError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

/// A named scan subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Store-assigned identifier, stable for the target's lifetime.
    pub id: i64,
    /// User-supplied name, never empty.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

/// Create a new target.
///
/// # Errors
/// Returns `StoreError::Validation` if `name` is empty or blank.
pub async fn create_target(
    pool: &SqlitePool,
    name: &str,
    description: Option<&str>,
) -> Result<Target> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::Validation(
            "target name must not be empty".to_string(),
        ));
    }

    let created_at = Utc::now().to_rfc3339();
    let result = sqlx::query("INSERT INTO targets (name, description, created_at) VALUES (?, ?, ?)")
        .bind(name)
        .bind(description)
        .bind(&created_at)
        .execute(pool)
        .await?;

    let id = result.last_insert_rowid();
    tracing::info!("Created target {} ({})", id, name);

    Ok(Target {
        id,
        name: name.to_string(),
        description: description.map(ToString::to_string),
        created_at,
    })
}

/// List all targets.
///
/// Returns a full snapshot in unspecified order; callers re-sort as needed.
pub async fn list_targets(pool: &SqlitePool) -> Result<Vec<Target>> {
    let rows = sqlx::query("SELECT id, name, description, created_at FROM targets")
        .fetch_all(pool)
        .await?;

    let mut targets = Vec::with_capacity(rows.len());
    for row in rows {
        targets.push(Target {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
        });
    }

    Ok(targets)
}

/// Get a single target by id.
pub async fn get_target(pool: &SqlitePool, id: i64) -> Result<Option<Target>> {
    let row = sqlx::query("SELECT id, name, description, created_at FROM targets WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(r) => Ok(Some(Target {
            id: r.try_get("id")?,
            name: r.try_get("name")?,
            description: r.try_get("description")?,
            created_at: r.try_get("created_at")?,
        })),
        None => Ok(None),
    }
}

/// Delete a target and every scan referencing it.
///
/// The target row and its scans go in one transaction, so no orphan scan
/// can survive a partial failure. Deleting a missing id is a no-op.
pub async fn delete_target(pool: &SqlitePool, id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;

    let scans_deleted = sqlx::query("DELETE FROM scans WHERE target_id = ?")
        .bind(id)
        .execute(tx.as_mut())
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM targets WHERE id = ?")
        .bind(id)
        .execute(tx.as_mut())
        .await?;

    tx.commit().await?;
    tracing::info!("Deleted target {} and {} scans", id, scans_deleted);

    Ok(())
}
