//! Security-posture heuristics over response headers and cookies.
//!
//! Pure presence/flag checks: a missing defensive header is reported at a
//! fixed severity, a cookie missing hardening flags gets one issue string
//! per flag. No network access happens here; callers supply what they
//! captured.

use serde::{Deserialize, Serialize};

/// How much a missing header matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderSeverity {
    /// Absence enables a well-known attack class.
    High,
    /// Absence weakens defense in depth.
    Medium,
    /// Mostly hygiene.
    Low,
    /// Informational only.
    Info,
}

/// The response headers the posture check looks for.
///
/// Names are the canonical lower-case forms; matching is case-insensitive.
/// `server` and `x-powered-by` are disclosure headers: their presence is
/// the interesting signal, reported at info severity.
pub const SECURITY_HEADERS: [(&str, HeaderSeverity); 8] = [
    ("strict-transport-security", HeaderSeverity::High),
    ("content-security-policy", HeaderSeverity::High),
    ("x-frame-options", HeaderSeverity::Medium),
    ("x-content-type-options", HeaderSeverity::Medium),
    ("referrer-policy", HeaderSeverity::Low),
    ("permissions-policy", HeaderSeverity::Low),
    ("server", HeaderSeverity::Info),
    ("x-powered-by", HeaderSeverity::Info),
];

/// Presence and value of one checked header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFinding {
    /// Canonical lower-case header name.
    pub name: String,
    /// Observed value; `None` when the header was absent.
    pub value: Option<String>,
    /// Severity of absence.
    pub severity: HeaderSeverity,
}

impl HeaderFinding {
    /// True when the header was present in the response.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// Check captured response headers against [`SECURITY_HEADERS`].
///
/// Returns one finding per checked header, in the table's order, so absent
/// headers are visible rather than merely missing from the output.
#[must_use]
pub fn analyze_headers(headers: &[(String, String)]) -> Vec<HeaderFinding> {
    SECURITY_HEADERS
        .iter()
        .map(|(name, severity)| {
            let value = headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone());
            HeaderFinding {
                name: (*name).to_string(),
                value,
                severity: *severity,
            }
        })
        .collect()
}

/// A captured cookie with its hardening flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    /// Cookie name.
    pub name: String,
    /// `Secure` attribute present.
    pub secure: bool,
    /// `HttpOnly` attribute present.
    pub http_only: bool,
    /// `SameSite` attribute value, if set.
    pub same_site: Option<String>,
}

/// Hardening issues for one cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieFinding {
    /// Cookie name.
    pub name: String,
    /// One entry per missing flag; empty for a fully hardened cookie.
    pub issues: Vec<String>,
}

/// Flag cookies missing `Secure`, `HttpOnly`, or `SameSite`.
///
/// Fully hardened cookies still appear, with an empty issue list.
#[must_use]
pub fn analyze_cookies(cookies: &[CookieRecord]) -> Vec<CookieFinding> {
    cookies
        .iter()
        .map(|cookie| {
            let mut issues = Vec::new();
            if !cookie.secure {
                issues.push("missing Secure flag".to_string());
            }
            if !cookie.http_only {
                issues.push("missing HttpOnly flag".to_string());
            }
            if cookie.same_site.is_none() {
                issues.push("SameSite not set".to_string());
            }
            CookieFinding {
                name: cookie.name.clone(),
                issues,
            }
        })
        .collect()
}
