//! Settings storage for scan policy configuration.
//!
//! Provides key-value storage using the settings table, with values stored
//! as JSON, plus typed accessors for the two policy values the normalizer
//! re-reads on every pass: the comment-filter pattern list and the maximum
//! link count. Filter patterns are validated when written, never when
//! applied.

use crate::error::{Result, StoreError};
use serde_json::Value;
use sqlx::SqlitePool;

/// Key for the comment-filter pattern list.
pub const COMMENT_FILTERS_KEY: &str = "comment_filters";

/// Key for the maximum number of links kept per scan.
pub const MAX_LINKS_KEY: &str = "max_links";

/// Default comment filters: blank-only content and empty HTML comment shells.
pub const DEFAULT_COMMENT_FILTERS: [&str; 2] = [r"^\s*$", r"^<!--\s*-->$"];

/// Default maximum number of links kept per scan.
pub const DEFAULT_MAX_LINKS: usize = 1000;

/// Set a setting in the database
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &Value) -> Result<()> {
    let value_str =
        serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;

    sqlx::query(
        r"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = datetime('now')
        ",
    )
    .bind(key)
    .bind(value_str)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a setting from the database
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<Value>> {
    let row: Option<(String,)> = sqlx::query_as(
        r"
        SELECT value
        FROM settings
        WHERE key = ?
        ",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((value_str,)) => {
            let value: Value = serde_json::from_str(&value_str)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Delete a setting from the database
pub async fn delete_setting(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query(
        r"
        DELETE FROM settings
        WHERE key = ?
        ",
    )
    .bind(key)
    .execute(pool)
    .await?;

    Ok(())
}

fn validate_pattern(pattern: &str) -> Result<()> {
    regex::Regex::new(pattern).map_err(|e| StoreError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Get the configured comment filters, falling back to the defaults.
pub async fn comment_filters(pool: &SqlitePool) -> Result<Vec<String>> {
    match get_setting(pool, COMMENT_FILTERS_KEY).await? {
        Some(value) => serde_json::from_value(value)
            .map_err(|e| StoreError::Serialization(e.to_string())),
        None => Ok(DEFAULT_COMMENT_FILTERS
            .iter()
            .map(ToString::to_string)
            .collect()),
    }
}

/// Replace the comment-filter list.
///
/// # Errors
/// Returns `StoreError::InvalidPattern` for the first pattern that fails to
/// compile; the stored list is untouched in that case.
pub async fn set_comment_filters(pool: &SqlitePool, filters: &[String]) -> Result<()> {
    for pattern in filters {
        validate_pattern(pattern)?;
    }
    set_setting(pool, COMMENT_FILTERS_KEY, &serde_json::json!(filters)).await
}

/// Add a filter pattern if not already present.
///
/// # Errors
/// Returns `StoreError::InvalidPattern` if the pattern fails to compile.
pub async fn add_comment_filter(pool: &SqlitePool, pattern: &str) -> Result<()> {
    validate_pattern(pattern)?;
    let mut filters = comment_filters(pool).await?;
    if !filters.iter().any(|f| f == pattern) {
        filters.push(pattern.to_string());
        set_comment_filters(pool, &filters).await?;
    }
    Ok(())
}

/// Remove a filter pattern. Removing an absent pattern is a no-op.
pub async fn remove_comment_filter(pool: &SqlitePool, pattern: &str) -> Result<()> {
    let mut filters = comment_filters(pool).await?;
    filters.retain(|f| f != pattern);
    set_comment_filters(pool, &filters).await
}

/// Restore the default comment filters.
pub async fn reset_comment_filters(pool: &SqlitePool) -> Result<()> {
    let defaults: Vec<String> = DEFAULT_COMMENT_FILTERS
        .iter()
        .map(ToString::to_string)
        .collect();
    set_comment_filters(pool, &defaults).await
}

/// Get the configured maximum link count, falling back to the default.
pub async fn max_links(pool: &SqlitePool) -> Result<usize> {
    match get_setting(pool, MAX_LINKS_KEY).await? {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
        }
        None => Ok(DEFAULT_MAX_LINKS),
    }
}

/// Set the maximum link count.
///
/// # Errors
/// Returns `StoreError::Validation` if `count` is zero.
pub async fn set_max_links(pool: &SqlitePool, count: usize) -> Result<()> {
    if count == 0 {
        return Err(StoreError::Validation(
            "max links must be a positive integer".to_string(),
        ));
    }
    set_setting(pool, MAX_LINKS_KEY, &serde_json::json!(count)).await
}
