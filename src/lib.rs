// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # RedirectHunter - Redirect Chain Tracer
//!
//! Traces the full redirect chain of a URL across HTTP 3xx responses, HTML
//! meta refresh tags and JavaScript `location` assignments, and flags what it
//! sees on the way.
//!
//! ## Features
//!
//! - Manual redirect following: every hop recorded with status, timing, size
//! - Body redirects: meta refresh and JS `location` become synthetic hops
//! - SSRF detection: hops into private, loopback and link-local space
//! - Token leakage: credentials in query strings and fragments
//! - HTTPS downgrade detection
//! - Phishing heuristics on landing pages
//! - Resilient transport: retries with exponential backoff, proxy, fixed headers
//! - Parallel runner: worker pool with a global rate limit and cancellation
//! - Plugins: post-trace evaluators with their own findings
//! - FUZZ templates with wordlists, JSONL output
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use redirecthunter::{classify, InternalHostClassifier, ScanConfig, Target};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::default().threads(4);
//!     let classifier = Arc::new(InternalHostClassifier::default());
//!
//!     let runner = config.build_runner(Arc::clone(&classifier))?;
//!     let plugins = config.build_plugins(classifier)?;
//!
//!     let targets = vec![Target::new("https://example.com/?next=//evil.test")];
//!     let mut results = runner.run(&targets).await;
//!     plugins.apply(&mut results).await;
//!
//!     for result in &results {
//!         println!("{} -> {}", result.target, classify(result));
//!         for finding in &result.findings {
//!             println!("  [{}] {} {}", finding.severity, finding.kind, finding.detail);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod http;
pub mod plugin;
pub mod report;
pub mod runner;
pub mod security;
pub mod targets;

// Re-exports for convenience

// Chain model and tracing
pub use chain::{classify, Classification, Finding, FindingKind, Hop, Severity, TraceResult, Via};
pub use chain::{BodyRedirect, BodyRedirectScanner, TraceOptions, Tracer, MAX_BODY_SCAN_BYTES};

// Configuration
pub use config::{parse_header, ScanConfig};

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{HttpClient, HttpClientConfig, Request, RequestBody, Response};

// Plugins
pub use plugin::{FinalSsrfPlugin, PhishingPlugin, Plugin, PluginContext, PluginKind, PluginSet};

// Reports
pub use report::{JsonlWriter, Record, Summary};

// Runner
pub use runner::{RateLimiter, RunStats, Runner, RunnerConfig, MAX_RATE_LIMIT};

// Security
pub use security::{base_domain, same_base_domain, Detectors, InternalHostClassifier};

// Targets
pub use targets::{build_targets, load_wordlist, Target};

/// RedirectHunter version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
