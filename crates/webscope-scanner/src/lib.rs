//! WebScope Scanner - Page extraction and scan orchestration.
//!
//! Turns a rendered page snapshot into a normalized scan record: same-site
//! links, analyzed forms with raw-request renderings, comments from raw
//! source, DOM, and inline scripts, the script inventory, and DOM-XSS sink
//! candidates merged from static token scans and runtime hook observations.
//!
//! # Example
//!
//! ```ignore
//! use webscope_hook::HookRecorder;
//! use webscope_scanner::{HttpSourceFetcher, PageExtractor, ScanSession, StoreSettings};
//!
//! let (recorder, buffer) = HookRecorder::channel();
//! let fetcher = HttpSourceFetcher::new(std::time::Duration::from_secs(10))?;
//! let mut session = ScanSession::new(
//!     host,
//!     PageExtractor::new(fetcher),
//!     StoreSettings::new(store.pool().clone()),
//!     buffer,
//! );
//! let record = session.run_scan().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod comments;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod normalizer;
pub mod posture;
pub mod session;

// Re-export commonly used types
pub use error::{Result, ScanError};
pub use extractor::{base_domain, extract_from_snapshot, PageExtractor, PageSnapshot};
pub use fetch::{FetchError, HttpSourceFetcher, SourceFetcher};
pub use normalizer::{apply_comment_filters, normalize, PatternError, ScanPolicy};
pub use posture::{analyze_cookies, analyze_headers, CookieFinding, CookieRecord, HeaderFinding};
pub use session::{HostError, PageHost, ScanSession, SettingsProvider, StoreSettings};
