//! Shared data model for WebScope.
//!
//! Defines the extraction payload (the structured bundle of links, forms,
//! comments, scripts, and sink candidates produced by one page snapshot),
//! the hook record shapes forwarded by the runtime recorder, and the
//! normalized scan record that gets persisted.
//!
//! Field names serialize in the camelCase form the stored JSON blobs use,
//! so exported scan data stays structurally compatible across versions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One input, textarea, or select element inside a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    /// The `name` attribute, falling back to `id` when absent.
    pub name: String,
    /// The control type (`text`, `hidden`, `file`, `textarea`, `select-one`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// The `value` attribute; empty when unset.
    pub value: String,
    /// The `autocomplete` attribute, if present.
    pub autocomplete: Option<String>,
}

/// One analyzed form with its inputs and heuristic security issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    /// Submit URL, resolved against the page base.
    pub action: String,
    /// HTTP method in upper case (`GET` when unspecified).
    pub method: String,
    /// All input-like descendants, in document order.
    pub inputs: Vec<FormInput>,
    /// Heuristic issue strings (GET method, missing CSRF token, file upload).
    pub issues: Vec<String>,
}

/// Where a comment was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    /// Regex match over the refetched raw page source.
    RawHtml,
    /// Comment node found by walking the live DOM.
    Dom,
    /// Heuristic `//` or `/* */` match inside an inline script.
    Js,
}

/// A comment extracted from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Source of the comment.
    #[serde(rename = "type")]
    pub kind: CommentKind,
    /// Comment text including delimiters.
    pub content: String,
    /// 1-based line in the raw source; only for [`CommentKind::RawHtml`].
    #[serde(rename = "lineNumber", skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
}

/// One script element in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptRecord {
    /// Script loaded from a URL.
    External {
        /// Resolved source URL.
        src: String,
    },
    /// Inline script body, truncated for display.
    Inline {
        /// First 100 characters of the body plus an ellipsis marker.
        content: String,
    },
}

/// How a DOM-XSS sink candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SinkOrigin {
    /// Textual match of a sink identifier inside an inline script.
    #[serde(rename = "Static Analysis")]
    StaticAnalysis,
    /// Sink invocation observed by the runtime hook recorder.
    #[serde(rename = "Runtime Hook")]
    RuntimeHook,
}

/// A DOM-XSS sink candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkFinding {
    /// Static scan or runtime observation.
    #[serde(rename = "type")]
    pub origin: SinkOrigin,
    /// Sink identifier (`innerHTML`, `eval`, ...).
    pub value: String,
    /// Truncated surrounding content.
    pub snippet: String,
}

/// An event-listener registration observed by the hook recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookedEvent {
    /// Event name (`click`, `submit`, `mouseover`).
    pub event_type: String,
    /// Target descriptor: `tag#id.class`, or `window/document`.
    pub element: String,
    /// Stringified listener, truncated to 100 characters.
    pub listener: String,
}

/// The dynamic-request primitive that was intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// `fetch`-style request.
    Fetch,
    /// `XMLHttpRequest`-style request.
    Xhr,
}

/// An outbound request observed by the hook recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookedRequest {
    /// Which primitive was used.
    #[serde(rename = "type")]
    pub kind: RequestKind,
    /// Request URL as passed to the primitive.
    pub url: String,
}

/// The sink primitive that was intercepted at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SinkKind {
    /// Dynamic code execution.
    #[serde(rename = "eval")]
    Eval,
    /// Direct document output.
    #[serde(rename = "document.write")]
    DocumentWrite,
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eval => write!(f, "eval"),
            Self::DocumentWrite => write!(f, "document.write"),
        }
    }
}

/// A sink invocation observed by the hook recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkUsage {
    /// Which sink fired.
    #[serde(rename = "type")]
    pub kind: SinkKind,
    /// First 100 characters of the sink argument.
    pub content: String,
}

/// The structured bundle produced by one page snapshot.
///
/// `raw_forms[i]` is the synthetic raw-request rendering of `forms[i]`;
/// the two sequences stay index-aligned. `links` carries no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionPayload {
    /// Absolute, deduplicated, same-site URLs.
    pub links: Vec<String>,
    /// Analyzed forms in document order.
    pub forms: Vec<FormRecord>,
    /// Raw-request renderings, index-aligned with `forms`.
    pub raw_forms: Vec<String>,
    /// Comments, ordered raw_html then dom then js.
    pub comments: Vec<CommentRecord>,
    /// Script inventory in document order.
    pub scripts: Vec<ScriptRecord>,
    /// Static and runtime DOM-XSS sink candidates.
    pub dom_xss: Vec<SinkFinding>,
    /// Listener registrations forwarded from the hook recorder.
    pub hooked_events: Vec<HookedEvent>,
    /// Dynamic requests forwarded from the hook recorder.
    pub hooked_requests: Vec<HookedRequest>,
}

/// A normalized scan: the filtered payload stamped with URL and capture time.
///
/// This is the shape that gets persisted and rendered. Once saved it is
/// immutable; normalization never rewrites stored history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Page URL at capture time, `"unknown"` when unavailable.
    pub url: String,
    /// Capture time.
    pub timestamp: DateTime<Utc>,
    /// The normalized extraction payload.
    #[serde(flatten)]
    pub payload: ExtractionPayload,
}

/// Truncate a string to at most `max` characters on a character boundary.
///
/// Used for listener stringifications, sink content prefixes, and inline
/// script snippets, which are display artifacts rather than full captures.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = ExtractionPayload {
            links: vec!["https://example.com/a".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_value(&payload).expect("serialize payload");
        assert!(json.get("rawForms").is_some());
        assert!(json.get("domXss").is_some());
        assert!(json.get("hookedEvents").is_some());
        assert!(json.get("hookedRequests").is_some());
    }

    #[test]
    fn test_comment_kind_tags() {
        let comment = CommentRecord {
            kind: CommentKind::RawHtml,
            content: "<!-- hi -->".to_string(),
            line_number: Some(3),
        };
        let json = serde_json::to_value(&comment).expect("serialize comment");
        assert_eq!(json["type"], "raw_html");
        assert_eq!(json["lineNumber"], 3);

        let dom = CommentRecord {
            kind: CommentKind::Dom,
            content: "<!-- hi -->".to_string(),
            line_number: None,
        };
        let json = serde_json::to_value(&dom).expect("serialize comment");
        assert!(json.get("lineNumber").is_none());
    }

    #[test]
    fn test_sink_origin_labels() {
        let finding = SinkFinding {
            origin: SinkOrigin::StaticAnalysis,
            value: "innerHTML".to_string(),
            snippet: "el.innerHTML = x...".to_string(),
        };
        let json = serde_json::to_value(&finding).expect("serialize finding");
        assert_eq!(json["type"], "Static Analysis");
    }

    #[test]
    fn test_scan_record_flattens_payload() {
        let record = ScanRecord {
            url: "https://example.com/".to_string(),
            timestamp: Utc::now(),
            payload: ExtractionPayload::default(),
        };
        let json = serde_json::to_value(&record).expect("serialize record");
        assert!(json.get("links").is_some());
        assert!(json.get("payload").is_none());

        let back: ScanRecord = serde_json::from_value(json).expect("deserialize record");
        assert_eq!(back, record);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multi-byte characters stay on a boundary
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
