// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Base domain resolution
//!
//! Lightweight registrable-domain heuristic: the last two labels, or three
//! under a handful of well known two-label public suffixes. IP literals are
//! their own base domain.

use std::net::IpAddr;

use url::Url;

/// Two-label public suffixes that take a third label
const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "co.uk", "ac.uk", "gov.uk", "org.uk", "net.uk", "com.au", "net.au", "org.au", "co.jp",
    "com.br", "com.mx",
];

/// Base domain of a host name
pub fn base_domain(host: &str) -> String {
    let host = host
        .trim_end_matches('.')
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_ascii_lowercase();

    if host.is_empty() || host.parse::<IpAddr>().is_ok() {
        return host;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return host;
    }

    let last_two = labels[labels.len() - 2..].join(".");
    if labels.len() >= 3 && MULTI_LABEL_SUFFIXES.contains(&last_two.as_str()) {
        return labels[labels.len() - 3..].join(".");
    }

    last_two
}

/// Base domain of a URL, empty when it has no host
pub fn base_domain_of(url: &Url) -> String {
    url.host_str().map(base_domain).unwrap_or_default()
}

/// Base domain of a URL string, empty when it cannot be parsed
pub fn base_domain_str(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => base_domain_of(&url),
        Err(_) => String::new(),
    }
}

/// Check if two URL strings share a base domain
///
/// False when either side has no resolvable host.
pub fn same_base_domain(a: &str, b: &str) -> bool {
    let da = base_domain_str(a);
    let db = base_domain_str(b);
    !da.is_empty() && da == db
}
