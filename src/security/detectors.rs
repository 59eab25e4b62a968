// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-hop security detectors
//!
//! Every detector is pure and yields zero or one finding.

use std::sync::Arc;

use url::Url;

use super::internal_host::InternalHostClassifier;
use crate::chain::{Finding, FindingKind, Severity};

/// Parameter names that carry credentials
pub const SENSITIVE_KEYS: &[&str] = &[
    "token",
    "access_token",
    "id_token",
    "code",
    "session",
    "bearer",
];

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.contains(&key.as_str())
}

/// Host with port, the way it appeared in the URL
fn authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}

/// Detector set sharing one internal host classifier
#[derive(Debug, Clone, Default)]
pub struct Detectors {
    classifier: Arc<InternalHostClassifier>,
}

impl Detectors {
    /// Create detectors around a classifier
    pub fn new(classifier: InternalHostClassifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }

    /// Create detectors sharing an existing classifier
    pub fn with_shared(classifier: Arc<InternalHostClassifier>) -> Self {
        Self { classifier }
    }

    /// The classifier in use
    pub fn classifier(&self) -> &Arc<InternalHostClassifier> {
        &self.classifier
    }

    /// SSRF: the URL's host is internal
    pub fn ssrf(&self, url: &Url, hop: usize) -> Option<Finding> {
        if self.classifier.is_internal_url(url) {
            Some(Finding::core(
                FindingKind::Ssrf,
                Severity::High,
                hop,
                authority(url),
            ))
        } else {
            None
        }
    }

    /// HTTPS to HTTP downgrade between two consecutive URLs
    pub fn https_downgrade(&self, prev: &Url, next: &Url, hop: usize) -> Option<Finding> {
        if prev.scheme() == "https" && next.scheme() == "http" {
            Some(Finding::core(
                FindingKind::HttpsDowngrade,
                Severity::Medium,
                hop,
                format!("{} -> {}", prev, next),
            ))
        } else {
            None
        }
    }

    /// Sensitive key in the query (medium) or fragment (high)
    pub fn token_leakage(&self, url: &Url, hop: usize) -> Option<Finding> {
        for (key, _) in url.query_pairs() {
            if is_sensitive_key(&key) {
                return Some(Finding::core(
                    FindingKind::TokenLeak,
                    Severity::Medium,
                    hop,
                    format!("{} in query", key),
                ));
            }
        }

        let fragment = url.fragment().filter(|f| !f.is_empty())?;
        for part in fragment.split('&') {
            let (key, has_value) = match part.split_once('=') {
                Some((key, _)) => (key, true),
                None => (part, false),
            };
            if is_sensitive_key(key) {
                let detail = if has_value {
                    format!("{} in fragment", key)
                } else {
                    format!("{} in fragment (no value)", key)
                };
                return Some(Finding::core(
                    FindingKind::TokenLeak,
                    Severity::High,
                    hop,
                    detail,
                ));
            }
        }

        None
    }

    /// Phishing heuristics over a response body
    pub fn phishing_indicator(&self, body: &[u8], hop: usize) -> Option<Finding> {
        let lower = body.to_ascii_lowercase();

        if contains(&lower, b"<form") && contains(&lower, b"password") {
            return Some(Finding::core(
                FindingKind::PhishingIndicator,
                Severity::High,
                hop,
                "form with password field",
            ));
        }

        let suspicious = [&b"document.forms"[..], b"eval(", b"username"]
            .iter()
            .any(|needle| contains(&lower, needle));
        if suspicious {
            return Some(Finding::core(
                FindingKind::PhishingIndicator,
                Severity::Low,
                hop,
                "suspicious javascript",
            ));
        }

        None
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_ssrf() {
        let d = Detectors::default();

        let finding = d.ssrf(&url("http://127.0.0.1:8080/admin"), 2).unwrap();
        assert_eq!(finding.kind, FindingKind::Ssrf);
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.at_hop, 2);
        assert_eq!(finding.detail, "127.0.0.1:8080");
        assert!(finding.is_core());

        assert!(d.ssrf(&url("https://example.com/"), 0).is_none());
    }

    #[test]
    fn test_https_downgrade() {
        let d = Detectors::default();
        let secure = url("https://example.com/a");
        let plain = url("http://example.com/b");

        let finding = d.https_downgrade(&secure, &plain, 1).unwrap();
        assert_eq!(finding.severity, Severity::Medium);
        assert_eq!(
            finding.detail,
            "https://example.com/a -> http://example.com/b"
        );

        assert!(d.https_downgrade(&plain, &secure, 1).is_none());
        assert!(d.https_downgrade(&secure, &secure, 1).is_none());
    }

    #[test]
    fn test_token_in_query() {
        let d = Detectors::default();
        let finding = d
            .token_leakage(&url("https://example.com/cb?Access_Token=abc"), 0)
            .unwrap();
        assert_eq!(finding.severity, Severity::Medium);
        assert_eq!(finding.detail, "Access_Token in query");
    }

    #[test]
    fn test_token_in_fragment() {
        let d = Detectors::default();
        let finding = d
            .token_leakage(&url("https://example.com/cb#state=1&id_token=abc"), 3)
            .unwrap();
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.at_hop, 3);
        assert_eq!(finding.detail, "id_token in fragment");
    }

    #[test]
    fn test_token_key_only_fragment() {
        let d = Detectors::default();
        let finding = d
            .token_leakage(&url("https://example.com/#session"), 0)
            .unwrap();
        assert_eq!(finding.severity, Severity::High);
        assert!(finding.detail.contains("no value"));
    }

    #[test]
    fn test_query_wins_over_fragment() {
        let d = Detectors::default();
        let finding = d
            .token_leakage(&url("https://example.com/?code=1#token=2"), 0)
            .unwrap();
        assert_eq!(finding.severity, Severity::Medium);
    }

    #[test]
    fn test_no_token() {
        let d = Detectors::default();
        assert!(d
            .token_leakage(&url("https://example.com/?q=token#top"), 0)
            .is_none());
    }

    #[test]
    fn test_phishing_indicator() {
        let d = Detectors::default();

        let high = d
            .phishing_indicator(b"<FORM action=/x><input type=Password></form>", 1)
            .unwrap();
        assert_eq!(high.severity, Severity::High);

        let low = d
            .phishing_indicator(b"<script>eval(atob('x'))</script>", 1)
            .unwrap();
        assert_eq!(low.severity, Severity::Low);

        assert!(d.phishing_indicator(b"<h1>hello</h1>", 1).is_none());
        assert!(d.phishing_indicator(b"", 1).is_none());
    }
}
