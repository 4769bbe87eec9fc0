//! WebScope Report - Markdown rendering of scan records.
//!
//! Renders a persisted scan record, or a set of posture findings, as a
//! self-contained Markdown document. Sections with nothing to show are
//! omitted rather than rendered empty, so a quiet page yields a short
//! report.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use webscope_core::{CommentKind, ScanRecord, ScriptRecord, SinkOrigin};
use webscope_scanner::{CookieFinding, HeaderFinding};

/// Render a full scan record as a Markdown document.
#[must_use]
pub fn render_scan(record: &ScanRecord) -> String {
    let mut md = String::new();
    md.push_str("# Scan Report\n\n");
    md.push_str(&format!("- **URL:** {}\n", record.url));
    md.push_str(&format!(
        "- **Captured:** {}\n\n",
        record.timestamp.to_rfc3339()
    ));

    render_links(&mut md, record);
    render_forms(&mut md, record);
    render_comments(&mut md, record);
    render_scripts(&mut md, record);
    render_sinks(&mut md, record);
    render_hooks(&mut md, record);

    md
}

fn render_links(md: &mut String, record: &ScanRecord) {
    let links = &record.payload.links;
    if links.is_empty() {
        return;
    }
    md.push_str(&format!("## Links ({})\n\n", links.len()));
    for link in links {
        md.push_str(&format!("- {link}\n"));
    }
    md.push('\n');
}

fn render_forms(md: &mut String, record: &ScanRecord) {
    let forms = &record.payload.forms;
    if forms.is_empty() {
        return;
    }
    md.push_str(&format!("## Forms ({})\n\n", forms.len()));
    for (index, form) in forms.iter().enumerate() {
        md.push_str(&format!("### {} {}\n\n", form.method, form.action));
        if !form.inputs.is_empty() {
            md.push_str("| Name | Type | Value |\n|------|------|-------|\n");
            for input in &form.inputs {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    input.name, input.kind, input.value
                ));
            }
            md.push('\n');
        }
        for issue in &form.issues {
            md.push_str(&format!("- issue: {issue}\n"));
        }
        if !form.issues.is_empty() {
            md.push('\n');
        }
        if let Some(raw) = record.payload.raw_forms.get(index) {
            md.push_str(&format!("```http\n{raw}\n```\n\n"));
        }
    }
}

fn comment_kind_label(kind: CommentKind) -> &'static str {
    match kind {
        CommentKind::RawHtml => "raw source",
        CommentKind::Dom => "DOM",
        CommentKind::Js => "script",
    }
}

fn render_comments(md: &mut String, record: &ScanRecord) {
    let comments = &record.payload.comments;
    if comments.is_empty() {
        return;
    }
    md.push_str(&format!("## Comments ({})\n\n", comments.len()));
    for comment in comments {
        let location = match comment.line_number {
            Some(line) => format!("{}, line {line}", comment_kind_label(comment.kind)),
            None => comment_kind_label(comment.kind).to_string(),
        };
        md.push_str(&format!("- `{}` ({location})\n", comment.content));
    }
    md.push('\n');
}

fn render_scripts(md: &mut String, record: &ScanRecord) {
    let scripts = &record.payload.scripts;
    if scripts.is_empty() {
        return;
    }
    md.push_str(&format!("## Scripts ({})\n\n", scripts.len()));
    for script in scripts {
        match script {
            ScriptRecord::External { src } => md.push_str(&format!("- external: {src}\n")),
            ScriptRecord::Inline { content } => md.push_str(&format!("- inline: `{content}`\n")),
        }
    }
    md.push('\n');
}

fn render_sinks(md: &mut String, record: &ScanRecord) {
    let findings = &record.payload.dom_xss;
    if findings.is_empty() {
        return;
    }
    md.push_str(&format!("## DOM XSS Candidates ({})\n\n", findings.len()));
    for finding in findings {
        let origin = match finding.origin {
            SinkOrigin::StaticAnalysis => "static",
            SinkOrigin::RuntimeHook => "runtime",
        };
        md.push_str(&format!(
            "- **{}** ({origin}): `{}`\n",
            finding.value, finding.snippet
        ));
    }
    md.push('\n');
}

fn render_hooks(md: &mut String, record: &ScanRecord) {
    let events = &record.payload.hooked_events;
    let requests = &record.payload.hooked_requests;
    if events.is_empty() && requests.is_empty() {
        return;
    }
    md.push_str("## Runtime Observations\n\n");
    for event in events {
        md.push_str(&format!(
            "- listener `{}` on `{}`: `{}`\n",
            event.event_type, event.element, event.listener
        ));
    }
    for request in requests {
        md.push_str(&format!("- request: {}\n", request.url));
    }
    md.push('\n');
}

/// Render header and cookie posture findings as a Markdown document.
#[must_use]
pub fn render_posture(headers: &[HeaderFinding], cookies: &[CookieFinding]) -> String {
    let mut md = String::new();
    md.push_str("# Security Posture\n\n");

    if !headers.is_empty() {
        md.push_str("## Response Headers\n\n");
        md.push_str("| Header | Present | Severity if absent |\n|--------|---------|--------------------|\n");
        for finding in headers {
            let present = match &finding.value {
                Some(value) => format!("`{value}`"),
                None => "missing".to_string(),
            };
            md.push_str(&format!(
                "| {} | {} | {:?} |\n",
                finding.name, present, finding.severity
            ));
        }
        md.push('\n');
    }

    if !cookies.is_empty() {
        md.push_str("## Cookies\n\n");
        for cookie in cookies {
            if cookie.issues.is_empty() {
                md.push_str(&format!("- `{}`: hardened\n", cookie.name));
            } else {
                md.push_str(&format!(
                    "- `{}`: {}\n",
                    cookie.name,
                    cookie.issues.join(", ")
                ));
            }
        }
        md.push('\n');
    }

    md
}
