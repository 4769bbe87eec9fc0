//! Scan normalization: comment filtering, link capping, and stamping.
//!
//! A [`ScanPolicy`] compiles the stored filter patterns once per pass, so a
//! pattern that stopped compiling surfaces here as an error instead of
//! silently disabling filtering. Normalization only ever drops entries and
//! fills metadata; applying it twice yields the same record.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use webscope_core::{CommentRecord, ExtractionPayload, ScanRecord};
use webscope_db::settings::{DEFAULT_COMMENT_FILTERS, DEFAULT_MAX_LINKS};

/// A comment-filter pattern failed to compile.
#[derive(Debug, Error)]
#[error("invalid filter pattern '{pattern}': {reason}")]
pub struct PatternError {
    /// The offending pattern.
    pub pattern: String,
    /// Compiler diagnostic.
    pub reason: String,
}

static DEFAULT_FILTERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    DEFAULT_COMMENT_FILTERS
        .iter()
        .map(|p| Regex::new(p).expect("default filter patterns compile"))
        .collect()
});

/// Compiled normalization policy: comment filters plus the link cap.
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    filters: Vec<Regex>,
    max_links: usize,
}

impl ScanPolicy {
    /// Compile a policy from filter patterns and a link cap.
    ///
    /// # Errors
    /// Returns [`PatternError`] for the first pattern that fails to compile.
    pub fn new(patterns: &[String], max_links: usize) -> Result<Self, PatternError> {
        let mut filters = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let regex = Regex::new(pattern).map_err(|e| PatternError {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            filters.push(regex);
        }
        Ok(Self { filters, max_links })
    }

    /// The maximum number of links a normalized scan keeps.
    #[must_use]
    pub fn max_links(&self) -> usize {
        self.max_links
    }

    /// True when `content` matches none of the filter patterns.
    #[must_use]
    pub fn keeps(&self, content: &str) -> bool {
        !self.filters.iter().any(|f| f.is_match(content))
    }
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            filters: DEFAULT_FILTERS.clone(),
            max_links: DEFAULT_MAX_LINKS,
        }
    }
}

/// Drop comments whose content matches any filter pattern.
#[must_use]
pub fn apply_comment_filters(
    comments: Vec<CommentRecord>,
    policy: &ScanPolicy,
) -> Vec<CommentRecord> {
    comments
        .into_iter()
        .filter(|c| policy.keeps(&c.content))
        .collect()
}

/// Normalize a payload into the record shape that gets persisted.
///
/// Filters comments, truncates links to the policy cap keeping the earliest
/// entries, and stamps URL and capture time. A missing URL becomes
/// `"unknown"` rather than failing the scan.
#[must_use]
pub fn normalize(
    mut payload: ExtractionPayload,
    policy: &ScanPolicy,
    url: Option<&str>,
    timestamp: DateTime<Utc>,
) -> ScanRecord {
    payload.comments = apply_comment_filters(payload.comments, policy);
    if payload.links.len() > policy.max_links() {
        tracing::debug!(
            total = payload.links.len(),
            kept = policy.max_links(),
            "Truncating link list"
        );
        payload.links.truncate(policy.max_links());
    }
    ScanRecord {
        url: url.unwrap_or("unknown").to_string(),
        timestamp,
        payload,
    }
}
