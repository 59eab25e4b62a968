// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Output records and run summary

mod jsonl;

pub use jsonl::JsonlWriter;

use std::fmt;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::chain::{classify, Classification, Finding, TraceResult};

/// One JSONL line per target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Trace start (RFC 3339, UTC)
    pub timestamp: String,
    /// Target URL as given
    pub input_url: String,
    /// Wordlist entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// URL of the last hop, or the target when no hop was made
    pub final_url: String,
    /// Result label
    pub classification: Classification,
    /// Hop URLs in order
    pub redirect_chain: Vec<String>,
    /// Status of the last hop, 0 when none
    pub status_code: u16,
    /// Size of the last hop
    pub resp_len: u64,
    /// Trace duration (ms)
    pub duration_ms: u64,
    /// Core findings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<Finding>,
    /// Plugin findings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugin_findings: Vec<Finding>,
    /// Transport or URL error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Record {
    /// Build a record from a finished result
    pub fn from_result(result: &TraceResult) -> Self {
        let (final_url, status_code, resp_len) = match result.final_hop() {
            Some(hop) => (hop.url.clone(), hop.status, hop.size),
            None => (result.target.clone(), 0, 0),
        };

        Self {
            timestamp: result
                .started_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            input_url: result.target.clone(),
            payload: result.payload.clone(),
            final_url,
            classification: classify(result),
            redirect_chain: result.chain.iter().map(|h| h.url.clone()).collect(),
            status_code,
            resp_len,
            duration_ms: result.duration_ms,
            findings: result.core_findings().cloned().collect(),
            plugin_findings: result.plugin_findings().cloned().collect(),
            error: result.error.clone(),
        }
    }

    /// Has findings or an error
    pub fn is_risky(&self) -> bool {
        !self.findings.is_empty() || !self.plugin_findings.is_empty() || self.error.is_some()
    }
}

/// Counters over a batch of results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Results in the batch
    pub total: usize,
    /// Results with at least one finding
    pub with_findings: usize,
    /// Plugin findings across the batch
    pub plugin_findings: usize,
    /// Results with an error
    pub errors: usize,
    /// `open-redirect` results
    pub open_redirects: usize,
    /// `same-site-redirect` results
    pub same_site_redirects: usize,
    /// `ok` results
    pub ok: usize,
    /// `unknown` results
    pub unknown: usize,
    /// `error` results
    pub error_results: usize,
}

impl Summary {
    /// Count a batch
    pub fn from_results(results: &[TraceResult]) -> Self {
        let mut summary = Summary {
            total: results.len(),
            ..Summary::default()
        };

        for result in results {
            if !result.findings.is_empty() {
                summary.with_findings += 1;
            }
            summary.plugin_findings += result.plugin_findings().count();
            if result.error.is_some() {
                summary.errors += 1;
            }
            summary.add(classify(result));
        }

        summary
    }

    fn add(&mut self, classification: Classification) {
        match classification {
            Classification::OpenRedirect => self.open_redirects += 1,
            Classification::SameSiteRedirect => self.same_site_redirects += 1,
            Classification::Ok => self.ok += 1,
            Classification::Unknown => self.unknown += 1,
            Classification::Error => self.error_results += 1,
        }
    }

    /// Count for one label
    pub fn count(&self, classification: Classification) -> usize {
        match classification {
            Classification::OpenRedirect => self.open_redirects,
            Classification::SameSiteRedirect => self.same_site_redirects,
            Classification::Ok => self.ok,
            Classification::Unknown => self.unknown,
            Classification::Error => self.error_results,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} targets | {} with findings | {} plugin findings | {} errors |",
            self.total, self.with_findings, self.plugin_findings, self.errors
        )?;
        for classification in Classification::all() {
            write!(f, " {}={}", classification, self.count(classification))?;
        }
        Ok(())
    }
}
