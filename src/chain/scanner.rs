// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Body redirect scanner
//!
//! Textual heuristic for client-side redirects in HTML bodies. Meta refresh is
//! checked before JavaScript `location` assignments, and only the first match
//! of each is considered.

use lazy_static::lazy_static;
use regex::bytes::Regex;
use url::Url;

use super::Via;

/// Most bytes of a body read before scanning
pub const MAX_BODY_SCAN_BYTES: usize = 512 * 1024;

lazy_static! {
    static ref META_REFRESH: Regex = Regex::new(
        r#"(?i)<meta[^>]*http-equiv\s*=\s*["']?refresh["']?[^>]*content\s*=\s*["']\s*\d+\s*;\s*url\s*=\s*['"]?([^"'>\s]+)"#
    )
    .unwrap();
    static ref JS_LOCATION: Regex = Regex::new(
        r##"(?i)(?:window\.|document\.|top\.|self\.)?location(?:\.href)?\s*=\s*['"]([^'"#][^'"]*)['"]"##
    )
    .unwrap();
}

/// Redirect target found in a body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyRedirect {
    /// Target resolved against the page URL
    pub url: Url,
    /// Mechanism that triggered it
    pub via: Via,
}

/// Finds meta refresh and JS redirects in HTML
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyRedirectScanner;

impl BodyRedirectScanner {
    /// Create a new scanner
    pub fn new() -> Self {
        Self
    }

    /// Only HTML bodies are worth reading
    pub fn should_inspect(&self, content_type: Option<&str>) -> bool {
        let Some(ct) = content_type else {
            return false;
        };
        let ct = ct.to_ascii_lowercase();
        ct.contains("text/html") || ct.contains("application/xhtml")
    }

    /// Detect the first client-side redirect in `body`
    pub fn detect(&self, body: &[u8], base: &Url) -> Option<BodyRedirect> {
        if let Some(url) = first_capture(&META_REFRESH, body).and_then(|t| resolve(base, &t)) {
            return Some(BodyRedirect {
                url,
                via: Via::MetaRefresh,
            });
        }

        first_capture(&JS_LOCATION, body)
            .and_then(|t| resolve(base, &t))
            .map(|url| BodyRedirect { url, via: Via::Js })
    }
}

fn first_capture(re: &Regex, body: &[u8]) -> Option<String> {
    let caps = re.captures(body)?;
    let raw = caps.get(1)?.as_bytes();
    let text = String::from_utf8_lossy(raw);
    let text = text.trim().replace("&amp;", "&");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn resolve(base: &Url, target: &str) -> Option<Url> {
    base.join(target).ok()
}
