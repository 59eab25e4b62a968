// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Result classification

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Hop, TraceResult};
use crate::security::same_base_domain;

/// Label assigned to a finished trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// Redirect that lands on a foreign base domain
    OpenRedirect,
    /// Redirects that stay on the target's base domain
    SameSiteRedirect,
    /// Direct answer without redirects
    Ok,
    /// No status observed
    Unknown,
    /// Transport error or error status
    Error,
}

impl Classification {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::OpenRedirect => "open-redirect",
            Classification::SameSiteRedirect => "same-site-redirect",
            Classification::Ok => "ok",
            Classification::Unknown => "unknown",
            Classification::Error => "error",
        }
    }

    /// All labels, in report order
    pub fn all() -> [Classification; 5] {
        [
            Classification::OpenRedirect,
            Classification::SameSiteRedirect,
            Classification::Ok,
            Classification::Unknown,
            Classification::Error,
        ]
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a trace result
pub fn classify(result: &TraceResult) -> Classification {
    if result.error.is_some() {
        return Classification::Error;
    }

    let (final_url, final_status) = match result.final_hop() {
        Some(hop) => (hop.url.as_str(), hop.status),
        None => (result.target.as_str(), 0),
    };

    if result.chain.iter().any(Hop::is_redirect) {
        if found_to_ok_across_domains(&result.chain)
            || !same_base_domain(&result.target, final_url)
        {
            return Classification::OpenRedirect;
        }
        return Classification::SameSiteRedirect;
    }

    match final_status {
        200 => Classification::Ok,
        0 => Classification::Unknown,
        s if s >= 400 => Classification::Error,
        _ => Classification::Ok,
    }
}

/// A 302 hop directly followed by a 200 hop on another base domain
fn found_to_ok_across_domains(chain: &[Hop]) -> bool {
    chain.windows(2).any(|pair| {
        pair[0].status == 302 && pair[1].status == 200 && !same_base_domain(&pair[0].url, &pair[1].url)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Via;

    fn hop(status: u16, url: &str) -> Hop {
        Hop {
            index: 0,
            url: url.to_string(),
            method: "GET".to_string(),
            status,
            via: Via::HttpLocation,
            time_ms: 0,
            size: 0,
            is_final: false,
        }
    }

    fn result(target: &str, chain: Vec<Hop>) -> TraceResult {
        let mut result = TraceResult::new(target);
        result.chain = chain;
        result
    }

    #[test]
    fn test_cross_domain_redirect() {
        let r = result(
            "https://a.example.com",
            vec![
                hop(302, "https://a.example.com/start"),
                hop(200, "https://other.com/home"),
            ],
        );
        assert_eq!(classify(&r), Classification::OpenRedirect);
    }

    #[test]
    fn test_same_domain_302_to_200() {
        let r = result(
            "https://www.example.com",
            vec![
                hop(302, "https://www.example.com/go"),
                hop(200, "https://example.com/welcome"),
            ],
        );
        assert_eq!(classify(&r), Classification::SameSiteRedirect);
    }

    #[test]
    fn test_same_domain_301_to_200() {
        let r = result(
            "https://www.example.com",
            vec![
                hop(301, "https://www.example.com/go"),
                hop(200, "https://example.com/welcome"),
            ],
        );
        assert_eq!(classify(&r), Classification::SameSiteRedirect);
    }

    #[test]
    fn test_foreign_hop_inside_chain() {
        // 302 -> 200 on a foreign domain, then back home through a body redirect
        let r = result(
            "https://example.com",
            vec![
                hop(302, "https://example.com/out"),
                hop(200, "https://evil.test/bounce"),
                hop(0, "https://example.com/home"),
                hop(200, "https://example.com/home"),
            ],
        );
        assert_eq!(classify(&r), Classification::OpenRedirect);
    }

    #[test]
    fn test_direct_ok() {
        let r = result("https://example.com", vec![hop(200, "https://example.com")]);
        assert_eq!(classify(&r), Classification::Ok);
    }

    #[test]
    fn test_error_status() {
        let r = result(
            "https://example.com/missing",
            vec![hop(404, "https://example.com/missing")],
        );
        assert_eq!(classify(&r), Classification::Error);
    }

    #[test]
    fn test_other_statuses() {
        let r = result("https://example.com", vec![hop(204, "https://example.com")]);
        assert_eq!(classify(&r), Classification::Ok);

        let empty = result("https://example.com", Vec::new());
        assert_eq!(classify(&empty), Classification::Unknown);
    }

    #[test]
    fn test_error_wins() {
        let mut r = result("https://example.com", vec![hop(200, "https://example.com")]);
        r.error = Some("connection refused".to_string());
        assert_eq!(classify(&r), Classification::Error);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&Classification::SameSiteRedirect).unwrap(),
            "\"same-site-redirect\""
        );
        assert_eq!(Classification::OpenRedirect.to_string(), "open-redirect");
    }
}
