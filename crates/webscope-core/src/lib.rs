//! WebScope Core - Foundation crate for the WebScope page-inspection toolkit.
//!
//! This crate provides the shared data model, configuration management, and
//! error types that all other WebScope crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Configuration error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - The extraction payload and hook record shapes
//!
//! # Example
//!
//! ```rust
//! use webscope_core::{AppConfig, ExtractionPayload};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert!(config.scanning.fetch_timeout_secs > 0);
//!
//! let payload = ExtractionPayload::default();
//! assert!(payload.links.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, ScanningConfig};
pub use error::{ConfigError, ConfigResult};
pub use types::{
    truncate_chars, CommentKind, CommentRecord, ExtractionPayload, FormInput, FormRecord,
    HookedEvent, HookedRequest, RequestKind, ScanRecord, ScriptRecord, SinkFinding, SinkKind,
    SinkOrigin, SinkUsage,
};
