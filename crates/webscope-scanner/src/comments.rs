//! Comment extraction from the three places comments hide.
//!
//! Raw-source comments carry 1-based line numbers so a finding can be
//! located in the served HTML. DOM comments cover markup injected after
//! load, where no source line exists. Script comments come from a heuristic
//! regex over inline script bodies; string literals that look like comments
//! will match, which is acceptable for a discovery aid.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};
use webscope_core::{CommentKind, CommentRecord};

static RAW_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("raw comment pattern compiles"));

static JS_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)//[^\n]*|/\*.*?\*/").expect("js comment pattern compiles"));

/// Extract HTML comments from the raw page source, with 1-based line numbers.
#[must_use]
pub fn raw_source_comments(source: &str) -> Vec<CommentRecord> {
    RAW_COMMENT_RE
        .find_iter(source)
        .map(|m| {
            let line = source[..m.start()].matches('\n').count() + 1;
            CommentRecord {
                kind: CommentKind::RawHtml,
                content: m.as_str().to_string(),
                line_number: Some(u32::try_from(line).unwrap_or(u32::MAX)),
            }
        })
        .collect()
}

/// Extract comment nodes from the parsed document.
///
/// Whitespace-only comments are dropped; the rest are re-wrapped in
/// delimiters so all comment records read uniformly.
#[must_use]
pub fn dom_comments(document: &Html) -> Vec<CommentRecord> {
    document
        .tree
        .nodes()
        .filter_map(|node| {
            if let Node::Comment(comment) = node.value() {
                let text = comment.trim();
                if text.is_empty() {
                    return None;
                }
                Some(CommentRecord {
                    kind: CommentKind::Dom,
                    content: format!("<!-- {text} -->"),
                    line_number: None,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Extract `//` and `/* */` comments from inline script bodies.
#[must_use]
pub fn script_comments(script_bodies: &[String]) -> Vec<CommentRecord> {
    let mut out = Vec::new();
    for body in script_bodies {
        for m in JS_COMMENT_RE.find_iter(body) {
            out.push(CommentRecord {
                kind: CommentKind::Js,
                content: m.as_str().to_string(),
                line_number: None,
            });
        }
    }
    out
}

/// Collect comments from every source, ordered raw source, then DOM,
/// then inline scripts.
///
/// `raw_source` is `None` when the refetch failed; raw-source comments are
/// simply absent in that case.
#[must_use]
pub fn collect_comments(
    raw_source: Option<&str>,
    document: &Html,
    script_bodies: &[String],
) -> Vec<CommentRecord> {
    let mut comments = match raw_source {
        Some(source) => raw_source_comments(source),
        None => Vec::new(),
    };
    comments.extend(dom_comments(document));
    comments.extend(script_comments(script_bodies));
    comments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_comments_carry_line_numbers() {
        let source = "<html>\n<head>\n<!-- first -->\n</head>\n<body>\n<!-- second\nspans lines -->\n</body>\n</html>";
        let comments = raw_source_comments(source);

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "<!-- first -->");
        assert_eq!(comments[0].line_number, Some(3));
        assert_eq!(comments[1].line_number, Some(6));
        assert!(comments[1].content.contains("spans lines"));
    }

    #[test]
    fn test_dom_comments_skip_blank_and_rewrap() {
        let document = Html::parse_document(
            "<html><body><!--   --><!--  debug marker  --><p>text</p></body></html>",
        );
        let comments = dom_comments(&document);

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].kind, CommentKind::Dom);
        assert_eq!(comments[0].content, "<!-- debug marker -->");
        assert_eq!(comments[0].line_number, None);
    }

    #[test]
    fn test_script_comments_match_both_styles() {
        let bodies = vec![
            "var a = 1; // api key lives in config\n/* TODO:\n rotate creds */ run();".to_string(),
        ];
        let comments = script_comments(&bodies);

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "// api key lives in config");
        assert!(comments[1].content.starts_with("/* TODO:"));
        assert!(comments.iter().all(|c| c.kind == CommentKind::Js));
    }

    #[test]
    fn test_collect_orders_sources() {
        let source = "<!-- raw -->";
        let document = Html::parse_document("<html><body><!-- dom --></body></html>");
        let bodies = vec!["// js".to_string()];

        let comments = collect_comments(Some(source), &document, &bodies);
        let kinds: Vec<CommentKind> = comments.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![CommentKind::RawHtml, CommentKind::Dom, CommentKind::Js]);
    }

    #[test]
    fn test_collect_without_raw_source() {
        let document = Html::parse_document("<html><body><!-- dom --></body></html>");
        let comments = collect_comments(None, &document, &[]);

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].kind, CommentKind::Dom);
    }
}
