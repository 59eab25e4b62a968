// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Landing page phishing plugin

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::Plugin;
use crate::chain::{Finding, Severity, TraceResult};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig};

/// Bytes of the landing page inspected
pub const PHISHING_READ_LIMIT: usize = 8 * 1024;

/// Re-fetches the final URL and looks for forms and `eval(`
pub struct PhishingPlugin {
    client: HttpClient,
}

impl PhishingPlugin {
    /// Create the plugin with its own client
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Derive a short-timeout, no-retry client from the scan transport settings
    pub fn from_config(config: &HttpClientConfig) -> Result<Self> {
        let config = config
            .clone()
            .timeout(Duration::from_secs(5))
            .retries(0);
        Ok(Self::new(HttpClient::with_config(config)?))
    }
}

#[async_trait]
impl Plugin for PhishingPlugin {
    fn name(&self) -> &str {
        "phishing"
    }

    async fn evaluate(&self, result: &TraceResult) -> Vec<Finding> {
        let Some(last) = result.final_hop() else {
            return Vec::new();
        };

        let body = match self.client.get(&last.url).await {
            Ok(response) => match response.read_limited(PHISHING_READ_LIMIT).await {
                Ok(body) => body,
                Err(e) => {
                    debug!(url = %last.url, error = %e, "Landing page read failed");
                    return Vec::new();
                }
            },
            Err(e) => {
                debug!(url = %last.url, error = %e, "Landing page fetch failed");
                return Vec::new();
            }
        };

        let lower = String::from_utf8_lossy(&body).to_lowercase();
        let mut findings = Vec::new();
        if lower.contains("<form") {
            findings.push(Finding::new(
                "PHISHING_FORM",
                Severity::Medium,
                last.index,
                last.url.clone(),
            ));
        }
        if lower.contains("eval(") {
            findings.push(Finding::new(
                "PHISHING_EVAL",
                Severity::Low,
                last.index,
                last.url.clone(),
            ));
        }
        findings
    }
}
