// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Final-hop SSRF plugin

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::Plugin;
use crate::chain::{Finding, Severity, TraceResult};
use crate::security::InternalHostClassifier;

/// Reports `FINAL_SSRF` when a chain ends on an internal host
pub struct FinalSsrfPlugin {
    classifier: Arc<InternalHostClassifier>,
}

impl FinalSsrfPlugin {
    /// Create the plugin around a classifier
    pub fn new(classifier: Arc<InternalHostClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl Plugin for FinalSsrfPlugin {
    fn name(&self) -> &str {
        "final-ssrf"
    }

    async fn evaluate(&self, result: &TraceResult) -> Vec<Finding> {
        let Some(last) = result.final_hop() else {
            return Vec::new();
        };
        let Ok(url) = Url::parse(&last.url) else {
            return Vec::new();
        };

        if self.classifier.is_internal_url(&url) {
            vec![Finding::new(
                "FINAL_SSRF",
                Severity::High,
                last.index,
                last.url.clone(),
            )]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{FindingKind, Hop, Via};

    fn result_ending_at(url: &str) -> TraceResult {
        let mut result = TraceResult::new("https://example.com");
        result.chain.push(Hop {
            index: 0,
            url: "https://example.com".to_string(),
            method: "GET".to_string(),
            status: 302,
            via: Via::HttpLocation,
            time_ms: 1,
            size: 0,
            is_final: false,
        });
        result.chain.push(Hop {
            index: 1,
            url: url.to_string(),
            method: "GET".to_string(),
            status: 200,
            via: Via::HttpLocation,
            time_ms: 1,
            size: 0,
            is_final: true,
        });
        result
    }

    #[tokio::test]
    async fn test_internal_final_hop() {
        let plugin = FinalSsrfPlugin::new(Arc::new(InternalHostClassifier::default()));
        let findings = plugin
            .evaluate(&result_ending_at("http://169.254.169.254/latest/meta-data"))
            .await;

        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].kind,
            FindingKind::Custom("FINAL_SSRF".to_string())
        );
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].at_hop, 1);
    }

    #[tokio::test]
    async fn test_external_final_hop() {
        let plugin = FinalSsrfPlugin::new(Arc::new(InternalHostClassifier::default()));
        assert!(plugin
            .evaluate(&result_ending_at("https://example.org/"))
            .await
            .is_empty());
        assert!(plugin
            .evaluate(&TraceResult::new("http://127.0.0.1/"))
            .await
            .is_empty());
    }
}
