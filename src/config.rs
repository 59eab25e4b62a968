// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan configuration
//!
//! Every knob of a run in one place, validated before any request is sent.

use std::sync::Arc;
use std::time::Duration;

use crate::chain::{TraceOptions, Tracer, MAX_BODY_SCAN_BYTES};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, DEFAULT_USER_AGENT};
use crate::plugin::{PluginContext, PluginKind, PluginSet};
use crate::runner::{tick_period, Runner, RunnerConfig};
use crate::security::{Detectors, InternalHostClassifier};

/// Scan configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Worker tasks
    pub threads: usize,
    /// Traces started per second, 0 = unlimited
    pub rate_limit: u32,
    /// Maximum hops per chain, synthetic hops included
    pub max_chain: usize,
    /// Follow meta refresh and JS redirects
    pub js_scan: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries per request
    pub retries: u32,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Extra headers sent with every request
    pub headers: Vec<(String, String)>,
    /// Cookie header sent with every request
    pub cookie: Option<String>,
    /// Skip TLS verification
    pub insecure: bool,
    /// Comma separated plugin names
    pub plugins: String,
    /// User agent string
    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threads: 10,
            rate_limit: 0,
            max_chain: 15,
            js_scan: true,
            timeout: Duration::from_secs(8),
            retries: 1,
            proxy: None,
            headers: vec![],
            cookie: None,
            insecure: false,
            plugins: "final-ssrf".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScanConfig {
    /// Create a new scan config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set worker count
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set rate limit
    pub fn rate_limit(mut self, per_second: u32) -> Self {
        self.rate_limit = per_second;
        self
    }

    /// Set maximum chain length
    pub fn max_chain(mut self, max_chain: usize) -> Self {
        self.max_chain = max_chain;
        self
    }

    /// Enable/disable body redirect following
    pub fn js_scan(mut self, enabled: bool) -> Self {
        self.js_scan = enabled;
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retries
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Add header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set cookie
    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Skip TLS verification
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Set plugin list
    pub fn plugins(mut self, plugins: impl Into<String>) -> Self {
        self.plugins = plugins.into();
        self
    }

    /// Reject settings that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(Error::config("threads must be greater than zero"));
        }
        if self.max_chain == 0 {
            return Err(Error::config("max-chain must be greater than zero"));
        }
        tick_period(self.rate_limit)?;
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than zero"));
        }
        for (name, _) in &self.headers {
            if name.trim().is_empty() {
                return Err(Error::invalid_header(name.as_str(), "empty key"));
            }
        }
        PluginKind::parse_list(&self.plugins)?;
        Ok(())
    }

    /// Transport settings
    pub fn http_client_config(&self) -> Result<HttpClientConfig> {
        let mut config = HttpClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            accept_invalid_certs: self.insecure,
            proxy: self.proxy.clone().filter(|p| !p.is_empty()),
            retries: self.retries,
            ..HttpClientConfig::default()
        };
        for (name, value) in &self.headers {
            config = config.header(name.trim(), value.trim())?;
        }
        if let Some(cookie) = self.cookie.as_deref().filter(|c| !c.is_empty()) {
            config = config.cookie(cookie);
        }
        Ok(config)
    }

    /// Tracer settings
    pub fn trace_options(&self) -> TraceOptions {
        TraceOptions {
            max_chain: self.max_chain,
            js_scan: self.js_scan,
            body_limit: MAX_BODY_SCAN_BYTES,
        }
    }

    /// Runner settings
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            threads: self.threads,
            rate_limit: self.rate_limit,
        }
    }

    /// Build a runner around a fresh transport and tracer
    pub fn build_runner(&self, classifier: Arc<InternalHostClassifier>) -> Result<Runner> {
        self.validate()?;
        let client = HttpClient::with_config(self.http_client_config()?)?;
        let tracer = Tracer::new(
            client,
            Detectors::with_shared(classifier),
            self.trace_options(),
        );
        Runner::new(self.runner_config(), tracer)
    }

    /// Build the configured plugins
    pub fn build_plugins(&self, classifier: Arc<InternalHostClassifier>) -> Result<PluginSet> {
        let ctx = PluginContext {
            classifier,
            client_config: self.http_client_config()?,
        };
        PluginSet::from_names(&self.plugins, &ctx)
    }
}

/// Parse a `Key: Value` header line
pub fn parse_header(line: &str) -> Result<(String, String)> {
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| Error::invalid_header(line, "expected Key: Value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::invalid_header(line, "empty key"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
