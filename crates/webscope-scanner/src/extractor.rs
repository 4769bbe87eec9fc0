//! Structured extraction from a rendered page snapshot.
//!
//! One pass over the parsed document produces the full extraction payload:
//! same-site links, analyzed forms with raw-request renderings, comments,
//! the script inventory, and DOM-XSS sink candidates. Runtime hook
//! observations are merged in at the end, so a payload always reflects one
//! consistent point in time.

use crate::comments;
use crate::error::{Result, ScanError};
use crate::fetch::SourceFetcher;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;
use webscope_core::{
    truncate_chars, ExtractionPayload, FormInput, FormRecord, ScriptRecord, SinkFinding,
    SinkOrigin, SinkUsage,
};
use webscope_hook::HookSnapshot;

/// Characters of an inline script body kept in the script inventory.
const INLINE_SCRIPT_PREFIX_CHARS: usize = 100;

/// Characters of script body kept as the sink-candidate snippet.
const SINK_SNIPPET_CHARS: usize = 50;

/// Property and method names that mark an inline script as a sink candidate.
const SINK_TOKENS: [&str; 4] = [
    "innerHTML",
    "outerHTML",
    "document.write",
    "document.writeln",
];

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector parses"));

static FORM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("form").expect("form selector parses"));

static CONTROL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input, textarea, select").expect("control selector parses"));

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("script selector parses"));

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s"'`<>]+"#).expect("url pattern compiles"));

/// A rendered page capture: the address bar URL and the serialized DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Absolute page URL at capture time.
    pub url: String,
    /// Serialized DOM of the rendered page.
    pub html: String,
}

/// Runs the extraction pipeline over page snapshots.
#[derive(Debug)]
pub struct PageExtractor<F> {
    fetcher: F,
}

impl<F: SourceFetcher> PageExtractor<F> {
    /// Build an extractor that refetches raw page source with `fetcher`.
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Extract the full payload from a snapshot, merging hook observations.
    ///
    /// The raw-source refetch is best-effort: on failure the raw comment
    /// pass is skipped and extraction continues from the rendered DOM alone.
    ///
    /// # Errors
    /// Returns `ScanError::PageUrl` if the snapshot URL is not absolute.
    pub async fn extract(
        &self,
        page: &PageSnapshot,
        hooks: HookSnapshot,
    ) -> Result<ExtractionPayload> {
        let raw_source = match self.fetcher.fetch_source(&page.url).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(url = %page.url, error = %e, "Raw source fetch failed; skipping raw comment pass");
                None
            }
        };
        extract_from_snapshot(page, raw_source.as_deref(), hooks)
    }
}

/// Synchronous extraction core, usable without a fetcher.
///
/// # Errors
/// Returns `ScanError::PageUrl` if the snapshot URL is not absolute.
pub fn extract_from_snapshot(
    page: &PageSnapshot,
    raw_source: Option<&str>,
    hooks: HookSnapshot,
) -> Result<ExtractionPayload> {
    let base = Url::parse(&page.url).map_err(|e| ScanError::PageUrl {
        url: page.url.clone(),
        reason: e.to_string(),
    })?;
    let document = Html::parse_document(&page.html);

    let links = harvest_links(&document, &page.html, &base);
    let forms = analyze_forms(&document, &base);
    let raw_forms = forms.iter().map(|f| render_raw_request(f, &base)).collect();
    let (scripts, bodies) = script_inventory(&document, &base);
    let comments = comments::collect_comments(raw_source, &document, &bodies);

    let mut dom_xss = static_sink_candidates(&bodies);
    dom_xss.extend(hooks.sinks.iter().map(runtime_sink_finding));

    Ok(ExtractionPayload {
        links,
        forms,
        raw_forms,
        comments,
        scripts,
        dom_xss,
        hooked_events: hooks.events,
        hooked_requests: hooks.requests,
    })
}

/// The naive registrable domain: the last two dot-separated labels.
///
/// `sub.shop.example.co.uk` yields `co.uk`, which over-matches for
/// multi-label public suffixes. Links are a discovery aid, so the cheap
/// heuristic is kept rather than pulling in a suffix list.
#[must_use]
pub fn base_domain(host: &str) -> &str {
    match host.rmatch_indices('.').nth(1) {
        Some((idx, _)) => &host[idx + 1..],
        None => host,
    }
}

/// Harvest same-site links from anchors and a URL regex over the DOM text.
///
/// Fragments are stripped before deduplication, first occurrence wins, and
/// only http(s) URLs on the page's host or base domain survive.
fn harvest_links(document: &Html, dom_text: &str, base: &Url) -> Vec<String> {
    let mut candidates = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        if let Some(href) = anchor.value().attr("href") {
            if let Ok(mut url) = base.join(href) {
                url.set_fragment(None);
                candidates.push(url);
            }
        }
    }

    for m in URL_RE.find_iter(dom_text) {
        if let Ok(mut url) = Url::parse(m.as_str()) {
            url.set_fragment(None);
            candidates.push(url);
        }
    }

    let page_host = base.host_str().unwrap_or_default();
    let base_dom = base_domain(page_host);
    let suffix = format!(".{base_dom}");

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for url in candidates {
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        let Some(host) = url.host_str() else { continue };
        if host != page_host && host != base_dom && !host.ends_with(&suffix) {
            continue;
        }
        let rendered = url.to_string();
        if seen.insert(rendered.clone()) {
            links.push(rendered);
        }
    }
    links
}

/// Analyze every form: resolved action, method, inputs, and heuristic issues.
fn analyze_forms(document: &Html, base: &Url) -> Vec<FormRecord> {
    document
        .select(&FORM_SELECTOR)
        .map(|form| {
            let method = form
                .value()
                .attr("method")
                .map(str::to_uppercase)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "GET".to_string());

            let action = match form.value().attr("action") {
                Some(raw) if !raw.trim().is_empty() => base
                    .join(raw)
                    .map_or_else(|_| raw.to_string(), |u| u.to_string()),
                _ => base.to_string(),
            };

            let inputs: Vec<FormInput> = form
                .select(&CONTROL_SELECTOR)
                .map(|control| {
                    let element = control.value();
                    let kind = match element.name() {
                        "textarea" => "textarea".to_string(),
                        "select" => "select-one".to_string(),
                        _ => element
                            .attr("type")
                            .map_or_else(|| "text".to_string(), str::to_lowercase),
                    };
                    FormInput {
                        name: element
                            .attr("name")
                            .or_else(|| element.attr("id"))
                            .unwrap_or("")
                            .to_string(),
                        kind,
                        value: element.attr("value").unwrap_or("").to_string(),
                        autocomplete: element.attr("autocomplete").map(ToString::to_string),
                    }
                })
                .collect();

            let issues = form_issues(&method, &inputs);
            FormRecord {
                action,
                method,
                inputs,
                issues,
            }
        })
        .collect()
}

fn form_issues(method: &str, inputs: &[FormInput]) -> Vec<String> {
    let mut issues = Vec::new();

    if method == "GET" {
        issues.push("GET method used (sensitive data exposure risk)".to_string());
    }

    let has_csrf_token = inputs.iter().any(|input| {
        if input.kind != "hidden" {
            return false;
        }
        let name = input.name.to_lowercase();
        name.contains("csrf") || name.contains("token")
    });
    if !has_csrf_token {
        issues.push("No CSRF token found (heuristic)".to_string());
    }

    if inputs.iter().any(|input| input.kind == "file") {
        issues.push("File upload present".to_string());
    }

    issues
}

fn host_with_port(base: &Url) -> String {
    let host = base.host_str().unwrap_or("");
    match base.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// Render a form as a synthetic raw HTTP request.
///
/// Empty input values are filled with `test` so the body shape is visible.
fn render_raw_request(form: &FormRecord, base: &Url) -> String {
    let body = form
        .inputs
        .iter()
        .map(|input| {
            let value = if input.value.is_empty() {
                "test"
            } else {
                input.value.as_str()
            };
            format!("{}={}", input.name, value)
        })
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{} {} HTTP/1.1\nHost: {}\nUser-Agent: WebScope/1.0\nContent-Type: application/x-www-form-urlencoded\n\n{}",
        form.method,
        form.action,
        host_with_port(base),
        body
    )
}

/// Inventory scripts, returning records plus the full inline bodies for the
/// comment and sink passes.
fn script_inventory(document: &Html, base: &Url) -> (Vec<ScriptRecord>, Vec<String>) {
    let mut scripts = Vec::new();
    let mut bodies = Vec::new();

    for element in document.select(&SCRIPT_SELECTOR) {
        if let Some(src) = element.value().attr("src") {
            let resolved = base
                .join(src)
                .map_or_else(|_| src.to_string(), |u| u.to_string());
            scripts.push(ScriptRecord::External { src: resolved });
        } else {
            let body: String = element.text().collect();
            if body.trim().is_empty() {
                continue;
            }
            scripts.push(ScriptRecord::Inline {
                content: format!("{}...", truncate_chars(&body, INLINE_SCRIPT_PREFIX_CHARS)),
            });
            bodies.push(body);
        }
    }
    (scripts, bodies)
}

/// Textual sink-token scan over inline script bodies.
///
/// A body mentioning `document.writeln` also contains `document.write`, so
/// it yields both candidates; readers triage, the scan does not.
fn static_sink_candidates(bodies: &[String]) -> Vec<SinkFinding> {
    let mut findings = Vec::new();
    for body in bodies {
        for token in SINK_TOKENS {
            if body.contains(token) {
                findings.push(SinkFinding {
                    origin: SinkOrigin::StaticAnalysis,
                    value: token.to_string(),
                    snippet: format!("{}...", truncate_chars(body, SINK_SNIPPET_CHARS)),
                });
            }
        }
    }
    findings
}

fn runtime_sink_finding(usage: &SinkUsage) -> SinkFinding {
    SinkFinding {
        origin: SinkOrigin::RuntimeHook,
        value: usage.kind.to_string(),
        snippet: usage.content.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webscope_core::SinkKind;

    fn snapshot(url: &str, html: &str) -> PageSnapshot {
        PageSnapshot {
            url: url.to_string(),
            html: html.to_string(),
        }
    }

    fn extract(url: &str, html: &str) -> ExtractionPayload {
        extract_from_snapshot(&snapshot(url, html), None, HookSnapshot::default())
            .expect("extraction succeeds")
    }

    #[test]
    fn test_base_domain() {
        assert_eq!(base_domain("example.com"), "example.com");
        assert_eq!(base_domain("shop.example.com"), "example.com");
        assert_eq!(base_domain("a.b.example.com"), "example.com");
        assert_eq!(base_domain("localhost"), "localhost");
    }

    #[test]
    fn test_links_resolved_deduplicated_and_same_site_only() {
        let payload = extract(
            "https://example.com/dir/page",
            r#"<html><body>
                <a href="/login">login</a>
                <a href="/login#section">anchored duplicate</a>
                <a href="relative">rel</a>
                <a href="https://sub.example.com/api">subdomain</a>
                <a href="https://evil.com/">offsite</a>
                <a href="mailto:x@example.com">mail</a>
                <p>see https://example.com/docs for details</p>
            </body></html>"#,
        );

        assert_eq!(
            payload.links,
            vec![
                "https://example.com/login",
                "https://example.com/dir/relative",
                "https://sub.example.com/api",
                "https://example.com/docs",
            ]
        );
    }

    #[test]
    fn test_form_analysis_defaults_and_issues() {
        let payload = extract(
            "https://example.com/",
            r#"<html><body>
                <form action="/search">
                    <input name="q" value="preset">
                    <input type="file" name="attachment">
                    <textarea name="notes"></textarea>
                    <select id="sort"><option>a</option></select>
                </form>
            </body></html>"#,
        );

        assert_eq!(payload.forms.len(), 1);
        let form = &payload.forms[0];
        assert_eq!(form.method, "GET");
        assert_eq!(form.action, "https://example.com/search");

        assert_eq!(form.inputs.len(), 4);
        assert_eq!(form.inputs[0].kind, "text");
        assert_eq!(form.inputs[1].kind, "file");
        assert_eq!(form.inputs[2].kind, "textarea");
        assert_eq!(form.inputs[3].kind, "select-one");
        // id fallback when name is absent
        assert_eq!(form.inputs[3].name, "sort");

        assert_eq!(
            form.issues,
            vec![
                "GET method used (sensitive data exposure risk)",
                "No CSRF token found (heuristic)",
                "File upload present",
            ]
        );
    }

    #[test]
    fn test_csrf_token_suppresses_issue() {
        let payload = extract(
            "https://example.com/",
            r#"<form method="post" action="/submit">
                <input type="hidden" name="CSRF_Token" value="abc">
                <input name="comment">
            </form>"#,
        );

        assert!(payload.forms[0].issues.is_empty());
        assert_eq!(payload.forms[0].method, "POST");
    }

    #[test]
    fn test_raw_request_rendering() {
        let payload = extract(
            "https://example.com:8443/",
            r#"<form method="post" action="/login">
                <input name="user" value="alice">
                <input type="password" name="pass">
            </form>"#,
        );

        assert_eq!(payload.raw_forms.len(), 1);
        let raw = &payload.raw_forms[0];
        assert!(raw.starts_with("POST https://example.com:8443/login HTTP/1.1\n"));
        assert!(raw.contains("Host: example.com:8443\n"));
        assert!(raw.contains("User-Agent: WebScope/1.0\n"));
        assert!(raw.contains("Content-Type: application/x-www-form-urlencoded\n\n"));
        // Empty values are filled so the body shape is visible
        assert!(raw.ends_with("user=alice&pass=test"));
    }

    #[test]
    fn test_script_inventory_and_truncation() {
        let long_body = "x".repeat(150);
        let html = format!(
            r#"<script src="/app.js"></script><script>{long_body}</script><script>  </script>"#
        );
        let payload = extract("https://example.com/", &html);

        assert_eq!(payload.scripts.len(), 2);
        assert_eq!(
            payload.scripts[0],
            ScriptRecord::External {
                src: "https://example.com/app.js".to_string()
            }
        );
        match &payload.scripts[1] {
            ScriptRecord::Inline { content } => {
                assert_eq!(content.len(), 103);
                assert!(content.ends_with("..."));
            }
            other => panic!("expected inline script, got {other:?}"),
        }
    }

    #[test]
    fn test_static_sinks_include_writeln_overlap() {
        let payload = extract(
            "https://example.com/",
            r"<script>document.writeln(user); el.innerHTML = data;</script>",
        );

        let values: Vec<&str> = payload.dom_xss.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, vec!["innerHTML", "document.write", "document.writeln"]);
        assert!(payload
            .dom_xss
            .iter()
            .all(|f| f.origin == SinkOrigin::StaticAnalysis));
        assert!(payload.dom_xss[0].snippet.ends_with("..."));
    }

    #[test]
    fn test_runtime_hooks_merge_after_static() {
        let hooks = HookSnapshot {
            sinks: vec![SinkUsage {
                kind: SinkKind::Eval,
                content: "alert(1)".to_string(),
            }],
            ..Default::default()
        };
        let payload = extract_from_snapshot(
            &snapshot(
                "https://example.com/",
                r"<script>el.innerHTML = data;</script>",
            ),
            None,
            hooks,
        )
        .expect("extraction succeeds");

        assert_eq!(payload.dom_xss.len(), 2);
        assert_eq!(payload.dom_xss[0].origin, SinkOrigin::StaticAnalysis);
        assert_eq!(payload.dom_xss[1].origin, SinkOrigin::RuntimeHook);
        assert_eq!(payload.dom_xss[1].value, "eval");
        assert_eq!(payload.dom_xss[1].snippet, "alert(1)");
    }

    #[test]
    fn test_invalid_page_url_rejected() {
        let result = extract_from_snapshot(
            &snapshot("not a url", "<html></html>"),
            None,
            HookSnapshot::default(),
        );
        assert!(matches!(result, Err(ScanError::PageUrl { .. })));
    }
}
