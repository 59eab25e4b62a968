// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Post-trace plugins
//!
//! Plugins look at finished results and may report extra findings. They run
//! after the whole batch, one result and one plugin at a time.
//!
//! # Example
//!
//! ```rust,no_run
//! use redirecthunter::chain::{Finding, Severity, TraceResult};
//! use redirecthunter::plugin::Plugin;
//! use async_trait::async_trait;
//!
//! struct LongChain;
//!
//! #[async_trait]
//! impl Plugin for LongChain {
//!     fn name(&self) -> &str {
//!         "long-chain"
//!     }
//!
//!     async fn evaluate(&self, result: &TraceResult) -> Vec<Finding> {
//!         if result.chain.len() > 5 {
//!             vec![Finding::new("LONG_CHAIN", Severity::Info, result.chain.len() - 1, "many hops")]
//!         } else {
//!             Vec::new()
//!         }
//!     }
//! }
//! ```

mod final_ssrf;
mod phishing;

pub use final_ssrf::FinalSsrfPlugin;
pub use phishing::{PhishingPlugin, PHISHING_READ_LIMIT};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::chain::{Finding, TraceResult};
use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use crate::security::InternalHostClassifier;

/// Post-trace evaluator
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Name stamped into the `source` of every finding
    fn name(&self) -> &str;

    /// Inspect a finished result
    async fn evaluate(&self, result: &TraceResult) -> Vec<Finding>;
}

/// Built-in plugins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    /// Final hop lands on an internal host
    FinalSsrf,
    /// Landing page looks like a phishing page
    Phishing,
}

impl PluginKind {
    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            PluginKind::FinalSsrf => "final-ssrf",
            PluginKind::Phishing => "phishing",
        }
    }

    /// Parse a comma separated list
    ///
    /// `none` and empty entries are skipped, duplicates collapse. Every
    /// unknown name is reported in one configuration error.
    pub fn parse_list(list: &str) -> Result<Vec<PluginKind>> {
        let mut kinds = Vec::new();
        let mut unknown = Vec::new();

        for name in list.split(',').map(str::trim) {
            if name.is_empty() || name.eq_ignore_ascii_case("none") {
                continue;
            }
            match name.parse::<PluginKind>() {
                Ok(kind) if !kinds.contains(&kind) => kinds.push(kind),
                Ok(_) => {}
                Err(_) => unknown.push(name.to_string()),
            }
        }

        if !unknown.is_empty() {
            return Err(Error::config(format!(
                "unknown plugin(s): {}",
                unknown.join(", ")
            )));
        }
        Ok(kinds)
    }

    /// Build the plugin
    pub fn build(&self, ctx: &PluginContext) -> Result<Arc<dyn Plugin>> {
        Ok(match self {
            PluginKind::FinalSsrf => Arc::new(FinalSsrfPlugin::new(Arc::clone(&ctx.classifier))),
            PluginKind::Phishing => Arc::new(PhishingPlugin::from_config(&ctx.client_config)?),
        })
    }
}

impl FromStr for PluginKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "final-ssrf" | "ssrf" => Ok(PluginKind::FinalSsrf),
            "phishing" => Ok(PluginKind::Phishing),
            other => Err(Error::config(format!("unknown plugin: {}", other))),
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared inputs for building plugins
#[derive(Debug, Clone, Default)]
pub struct PluginContext {
    /// Classifier used by the core SSRF detector
    pub classifier: Arc<InternalHostClassifier>,
    /// Transport settings plugins base their own clients on
    pub client_config: HttpClientConfig,
}

/// Ordered plugin collection
#[derive(Clone, Default)]
pub struct PluginSet {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the plugins named in a comma separated list
    pub fn from_names(list: &str, ctx: &PluginContext) -> Result<Self> {
        let mut set = Self::new();
        for kind in PluginKind::parse_list(list)? {
            set.plugins.push(kind.build(ctx)?);
        }
        Ok(set)
    }

    /// Add a plugin
    pub fn add<P: Plugin + 'static>(&mut self, plugin: P) {
        self.plugins.push(Arc::new(plugin));
    }

    /// Number of plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if no plugins are loaded
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin names in run order
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Append plugin findings to each result, tagged with the plugin name
    pub async fn apply(&self, results: &mut [TraceResult]) {
        for result in results.iter_mut() {
            for plugin in &self.plugins {
                let findings = plugin.evaluate(result).await;
                if findings.is_empty() {
                    continue;
                }
                debug!(
                    plugin = plugin.name(),
                    url = %result.target,
                    count = findings.len(),
                    "Plugin findings"
                );
                result
                    .findings
                    .extend(findings.into_iter().map(|mut finding| {
                        finding.source = plugin.name().to_string();
                        finding
                    }));
            }
        }
    }
}
