//! WebScope Hook - Runtime observation of page behavior.
//!
//! The hook recorder captures what static inspection cannot see: event
//! listener registrations, dynamic requests (fetch/XHR), and invocations of
//! injection sinks (eval, document.write). It wraps the host's primitives
//! with decorators that record an observation and then delegate to the
//! original callable, so interception is side-effect free.
//!
//! Observations travel over a one-way channel to a [`HookBuffer`], which the
//! page extractor drains as a point-in-time snapshot. Recorder and buffer
//! may live in different execution contexts; the channel keeps reads
//! consistent under concurrent appends.
//!
//! # Example
//!
//! ```rust
//! use webscope_hook::{HookRecorder, ElementDescriptor, ListenerRegistration};
//!
//! let (recorder, mut buffer) = HookRecorder::channel();
//! assert!(recorder.try_install());
//! assert!(!recorder.try_install()); // second injection is a no-op
//!
//! let mut register = recorder.wrap_listener_registration(|_reg: &ListenerRegistration| {
//!     // original registration runs here
//! });
//! register(&ListenerRegistration {
//!     event_type: "click",
//!     element: &ElementDescriptor::document(),
//!     listener_source: "() => openMenu()",
//! });
//!
//! let snapshot = buffer.snapshot();
//! assert_eq!(snapshot.events.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod record;
pub mod recorder;

// Re-export commonly used types
pub use record::{ElementDescriptor, HookRecord, HookSnapshot};
pub use recorder::{HookBuffer, HookRecorder, ListenerRegistration};
