// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Redirect chain model and tracing
//!
//! - Hop, finding and result types shared by every other module
//! - Body redirect scanner (meta refresh, JS `location` assignments)
//! - The tracer state machine
//! - Result classification

mod classify;
mod scanner;
mod tracer;

pub use classify::{classify, Classification};
pub use scanner::{BodyRedirect, BodyRedirectScanner, MAX_BODY_SCAN_BYTES};
pub use tracer::{TraceOptions, Tracer};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source tag for findings produced by the tracer itself
pub const CORE_SOURCE: &str = "core";

/// How a hop was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Via {
    /// Initial request or an HTTP `Location` header
    #[serde(rename = "http-location")]
    HttpLocation,
    /// `<meta http-equiv="refresh">` in an HTML body
    #[serde(rename = "meta-refresh")]
    MetaRefresh,
    /// JavaScript `location` assignment in an HTML body
    #[serde(rename = "js")]
    Js,
}

impl Via {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Via::HttpLocation => "http-location",
            Via::MetaRefresh => "meta-refresh",
            Via::Js => "js",
        }
    }
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a redirect chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hop {
    /// Position in the chain, synthetic hops included
    pub index: usize,
    /// URL as requested
    pub url: String,
    /// Request method
    pub method: String,
    /// Response status, 0 for synthetic hops
    pub status: u16,
    /// How this hop was reached
    pub via: Via,
    /// Time spent on the request, retries included
    pub time_ms: u64,
    /// Response size in bytes
    pub size: u64,
    /// Last hop of the chain
    #[serde(rename = "final")]
    pub is_final: bool,
}

impl Hop {
    /// Synthetic hops come from a body redirect and were never requested
    pub fn is_synthetic(&self) -> bool {
        self.status == 0
    }

    /// Check if status is redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

impl Severity {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finding type
///
/// Core kinds are fixed; plugins may report any other name through `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum FindingKind {
    Ssrf,
    HttpsDowngrade,
    TokenLeak,
    PhishingIndicator,
    ChainLoop,
    ChainTooLong,
    Custom(String),
}

impl FindingKind {
    /// Wire name
    pub fn as_str(&self) -> &str {
        match self {
            FindingKind::Ssrf => "SSRF",
            FindingKind::HttpsDowngrade => "HTTPS_DOWNGRADE",
            FindingKind::TokenLeak => "TOKEN_LEAK",
            FindingKind::PhishingIndicator => "PHISHING_INDICATOR",
            FindingKind::ChainLoop => "CHAIN_LOOP",
            FindingKind::ChainTooLong => "CHAIN_TOO_LONG",
            FindingKind::Custom(name) => name,
        }
    }
}

impl From<&str> for FindingKind {
    fn from(name: &str) -> Self {
        match name {
            "SSRF" => FindingKind::Ssrf,
            "HTTPS_DOWNGRADE" => FindingKind::HttpsDowngrade,
            "TOKEN_LEAK" => FindingKind::TokenLeak,
            "PHISHING_INDICATOR" => FindingKind::PhishingIndicator,
            "CHAIN_LOOP" => FindingKind::ChainLoop,
            "CHAIN_TOO_LONG" => FindingKind::ChainTooLong,
            other => FindingKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for FindingKind {
    fn from(name: String) -> Self {
        FindingKind::from(name.as_str())
    }
}

impl From<FindingKind> for String {
    fn from(kind: FindingKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detection attached to a hop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Finding type
    pub kind: FindingKind,
    /// Severity
    pub severity: Severity,
    /// Hop index the finding refers to
    pub at_hop: usize,
    /// Human readable detail
    pub detail: String,
    /// `core` or the name of the plugin that reported it
    pub source: String,
}

impl Finding {
    /// Create a core finding
    pub fn core(
        kind: FindingKind,
        severity: Severity,
        at_hop: usize,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            at_hop,
            detail: detail.into(),
            source: CORE_SOURCE.to_string(),
        }
    }

    /// Create a finding with an arbitrary kind, source left for the plugin set
    pub fn new(
        kind: impl Into<FindingKind>,
        severity: Severity,
        at_hop: usize,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            at_hop,
            detail: detail.into(),
            source: String::new(),
        }
    }

    /// Produced by the tracer rather than a plugin
    pub fn is_core(&self) -> bool {
        self.source.is_empty() || self.source.eq_ignore_ascii_case(CORE_SOURCE)
    }
}

/// Outcome of tracing one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// Target URL as given
    pub target: String,
    /// Wordlist entry the target was built from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// Hops in traversal order
    pub chain: Vec<Hop>,
    /// Core findings followed by plugin findings
    #[serde(default)]
    pub findings: Vec<Finding>,
    /// Trace start time
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the trace
    pub duration_ms: u64,
    /// Set when the chain stopped on a transport or URL error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TraceResult {
    /// Start an empty result for `target`
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            payload: None,
            chain: Vec::new(),
            findings: Vec::new(),
            started_at: Utc::now(),
            duration_ms: 0,
            error: None,
        }
    }

    /// A result that never produced a hop
    pub fn failed(target: impl Into<String>, error: impl Into<String>) -> Self {
        let mut result = Self::new(target);
        result.error = Some(error.into());
        result
    }

    /// Last hop of the chain
    pub fn final_hop(&self) -> Option<&Hop> {
        self.chain.last()
    }

    /// Findings produced by the tracer
    pub fn core_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_core())
    }

    /// Findings appended by plugins
    pub fn plugin_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_core())
    }

    /// Check for a finding of the given kind
    pub fn has_finding(&self, kind: &FindingKind) -> bool {
        self.findings.iter().any(|f| &f.kind == kind)
    }
}
