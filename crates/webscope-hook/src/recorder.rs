//! The hook recorder and its consumer-side buffer.
//!
//! The recorder is the producer half of an append-only observation queue.
//! Host embeddings compose the `wrap_*` decorators around the primitives
//! they expose to the page (listener registration, fetch, XHR, eval,
//! document.write); each decorator records an observation and then calls
//! through to the original. A failure to record never reaches the wrapped
//! call.

use crate::record::{ElementDescriptor, HookRecord, HookSnapshot};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use webscope_core::{truncate_chars, HookedEvent, HookedRequest, RequestKind, SinkKind, SinkUsage};

/// Events whose listener registrations are recorded.
const MONITORED_EVENTS: [&str; 3] = ["click", "submit", "mouseover"];

/// Maximum characters captured from listener sources and sink arguments.
const CAPTURE_PREFIX_CHARS: usize = 100;

/// A listener registration as seen at the host boundary.
#[derive(Debug, Clone, Copy)]
pub struct ListenerRegistration<'a> {
    /// Event name (`click`, `keydown`, ...).
    pub event_type: &'a str,
    /// Element the listener attaches to.
    pub element: &'a ElementDescriptor,
    /// Stringified listener body.
    pub listener_source: &'a str,
}

/// Producer half of the observation queue.
///
/// Cheap to hand to the host boundary; the matching [`HookBuffer`] drains
/// observations on the extractor side.
#[derive(Debug)]
pub struct HookRecorder {
    tx: mpsc::UnboundedSender<HookRecord>,
    installed: AtomicBool,
}

/// Consumer half of the observation queue.
#[derive(Debug)]
pub struct HookBuffer {
    rx: mpsc::UnboundedReceiver<HookRecord>,
}

impl HookRecorder {
    /// Create a connected recorder/buffer pair.
    #[must_use]
    pub fn channel() -> (Self, HookBuffer) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                installed: AtomicBool::new(false),
            },
            HookBuffer { rx },
        )
    }

    /// Claim the install guard.
    ///
    /// Returns `true` exactly once; repeated injections see `false` and must
    /// not wrap the host primitives again.
    pub fn try_install(&self) -> bool {
        let fresh = !self.installed.swap(true, Ordering::SeqCst);
        if fresh {
            tracing::debug!("hook recorder installed");
        }
        fresh
    }

    /// Whether hooks are already active.
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    fn record(&self, record: HookRecord) {
        // Buffer gone means the extractor side shut down; observations are
        // dropped and the intercepted call proceeds untouched.
        let _ = self.tx.send(record);
    }

    /// Record a listener registration for a monitored event.
    ///
    /// Registrations for other event types are ignored.
    pub fn record_listener(&self, registration: &ListenerRegistration<'_>) {
        if !MONITORED_EVENTS.contains(&registration.event_type) {
            return;
        }
        self.record(HookRecord::EventListener(HookedEvent {
            event_type: registration.event_type.to_string(),
            element: registration.element.render(),
            listener: truncate_chars(registration.listener_source, CAPTURE_PREFIX_CHARS)
                .to_string(),
        }));
    }

    /// Record an outbound request.
    pub fn record_request(&self, kind: RequestKind, url: &str) {
        self.record(HookRecord::DynamicRequest(HookedRequest {
            kind,
            url: url.to_string(),
        }));
    }

    /// Record a sink invocation, keeping a bounded content prefix.
    pub fn record_sink(&self, kind: SinkKind, content: &str) {
        self.record(HookRecord::SinkUsage(SinkUsage {
            kind,
            content: truncate_chars(content, CAPTURE_PREFIX_CHARS).to_string(),
        }));
    }

    /// Wrap a listener-registration primitive: record, then register.
    pub fn wrap_listener_registration<'a, F, T>(
        &'a self,
        mut original: F,
    ) -> impl FnMut(&ListenerRegistration<'_>) -> T + 'a
    where
        F: FnMut(&ListenerRegistration<'_>) -> T + 'a,
    {
        move |registration| {
            self.record_listener(registration);
            original(registration)
        }
    }

    /// Wrap a fetch-like primitive: record the URL, then delegate.
    pub fn wrap_fetch<'a, F, T>(&'a self, mut original: F) -> impl FnMut(&str) -> T + 'a
    where
        F: FnMut(&str) -> T + 'a,
    {
        move |url| {
            self.record_request(RequestKind::Fetch, url);
            original(url)
        }
    }

    /// Wrap an XHR-open-like primitive: record the URL, then delegate.
    pub fn wrap_xhr_open<'a, F, T>(&'a self, mut original: F) -> impl FnMut(&str, &str) -> T + 'a
    where
        F: FnMut(&str, &str) -> T + 'a,
    {
        move |method, url| {
            self.record_request(RequestKind::Xhr, url);
            original(method, url)
        }
    }

    /// Wrap an eval-like sink: record a content prefix, then delegate.
    pub fn wrap_eval<'a, F, T>(&'a self, mut original: F) -> impl FnMut(&str) -> T + 'a
    where
        F: FnMut(&str) -> T + 'a,
    {
        move |source| {
            self.record_sink(SinkKind::Eval, source);
            original(source)
        }
    }

    /// Wrap a document.write-like sink: record a content prefix, then delegate.
    pub fn wrap_document_write<'a, F, T>(&'a self, mut original: F) -> impl FnMut(&str) -> T + 'a
    where
        F: FnMut(&str) -> T + 'a,
    {
        move |markup| {
            self.record_sink(SinkKind::DocumentWrite, markup);
            original(markup)
        }
    }
}

impl HookBuffer {
    /// Drain everything buffered so far into a grouped snapshot.
    ///
    /// This is a point-in-time copy: observations appended concurrently with
    /// the drain land in the next snapshot instead of a partially read one.
    pub fn snapshot(&mut self) -> HookSnapshot {
        let mut snapshot = HookSnapshot::default();
        while let Ok(record) = self.rx.try_recv() {
            match record {
                HookRecord::EventListener(event) => snapshot.events.push(event),
                HookRecord::DynamicRequest(request) => snapshot.requests.push(request),
                HookRecord::SinkUsage(sink) => snapshot.sinks.push(sink),
            }
        }
        snapshot
    }
}
