//! Hook observation records and the snapshot shape handed to the extractor.

use serde::{Deserialize, Serialize};
use webscope_core::{HookedEvent, HookedRequest, SinkUsage};

/// One observation emitted by the recorder.
///
/// Serializes as `{"kind": "...", "data": {...}}`, the wire shape of the
/// recorder-to-extractor channel. Order within a single kind is preserved;
/// cross-kind ordering is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum HookRecord {
    /// A monitored event listener was registered.
    EventListener(HookedEvent),
    /// A fetch- or XHR-style request was issued.
    DynamicRequest(HookedRequest),
    /// An injection sink was invoked.
    SinkUsage(SinkUsage),
}

/// Descriptor of the element a listener was attached to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementDescriptor {
    /// Lower-case tag name; empty for non-element targets.
    pub tag: String,
    /// The `id` attribute, if any.
    pub id: Option<String>,
    /// The `class` attribute, if any.
    pub class: Option<String>,
}

impl ElementDescriptor {
    /// Descriptor for listeners attached to the window or document itself.
    #[must_use]
    pub fn document() -> Self {
        Self::default()
    }

    /// Render as `tag#id.class`, or `window/document` for non-elements.
    #[must_use]
    pub fn render(&self) -> String {
        if self.tag.is_empty() {
            return "window/document".to_string();
        }
        let mut out = self.tag.to_lowercase();
        if let Some(id) = &self.id {
            out.push('#');
            out.push_str(id);
        }
        if let Some(class) = &self.class {
            out.push('.');
            out.push_str(class);
        }
        out
    }
}

impl std::fmt::Display for ElementDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Point-in-time copy of all buffered observations, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookSnapshot {
    /// Listener registrations, in order of occurrence.
    pub events: Vec<HookedEvent>,
    /// Dynamic requests, in order of occurrence.
    pub requests: Vec<HookedRequest>,
    /// Sink invocations, in order of occurrence.
    pub sinks: Vec<SinkUsage>,
}

impl HookSnapshot {
    /// True when nothing was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.requests.is_empty() && self.sinks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webscope_core::{RequestKind, SinkKind};

    #[test]
    fn test_record_wire_shape() {
        let record = HookRecord::DynamicRequest(HookedRequest {
            kind: RequestKind::Fetch,
            url: "https://api.example.com/v1".to_string(),
        });
        let json = serde_json::to_value(&record).expect("serialize record");
        assert_eq!(json["kind"], "dynamic_request");
        assert_eq!(json["data"]["type"], "fetch");
        assert_eq!(json["data"]["url"], "https://api.example.com/v1");

        let sink = HookRecord::SinkUsage(SinkUsage {
            kind: SinkKind::DocumentWrite,
            content: "<b>hi</b>".to_string(),
        });
        let json = serde_json::to_value(&sink).expect("serialize sink");
        assert_eq!(json["kind"], "sink_usage");
        assert_eq!(json["data"]["type"], "document.write");
    }

    #[test]
    fn test_element_descriptor_render() {
        let el = ElementDescriptor {
            tag: "BUTTON".to_string(),
            id: Some("submit".to_string()),
            class: Some("btn primary".to_string()),
        };
        assert_eq!(el.render(), "button#submit.btn primary");

        let bare = ElementDescriptor {
            tag: "a".to_string(),
            id: None,
            class: None,
        };
        assert_eq!(bare.render(), "a");

        assert_eq!(ElementDescriptor::document().render(), "window/document");
    }
}
