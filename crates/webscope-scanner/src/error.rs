//! Error types for the scanner crate.

use thiserror::Error;

/// Errors a scan pass can surface to its caller.
///
/// Raw-source fetch failures never appear here; the extractor degrades to
/// DOM-only comment extraction when the refetch fails.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The page context went away mid-scan (navigation, tab close).
    #[error("page context gone: {0}")]
    HostGone(String),

    /// Every snapshot attempt failed with a transient error.
    #[error("snapshot request failed after {attempts} attempts: {last_error}")]
    SnapshotRetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The error from the final attempt.
        last_error: String,
    },

    /// The snapshot's page URL could not be parsed as an absolute URL.
    #[error("invalid page URL '{url}': {reason}")]
    PageUrl {
        /// The offending URL string.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A comment-filter pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] crate::normalizer::PatternError),

    /// Store error while reading scan policy settings.
    #[error("store error: {0}")]
    Store(#[from] webscope_db::StoreError),
}

/// Result type alias for scanner operations
pub type Result<T> = std::result::Result<T, ScanError>;
