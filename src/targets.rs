// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Target generation
//!
//! A template URL containing `FUZZ` is expanded once per wordlist entry.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Placeholder replaced by wordlist entries
pub const FUZZ_MARKER: &str = "FUZZ";

/// A URL to trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Resolved URL
    pub url: String,
    /// Wordlist entry the URL was built from
    pub payload: Option<String>,
}

impl Target {
    /// Target without a payload
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            payload: None,
        }
    }

    /// Attach a payload label
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// Build targets from a template and optional wordlist
///
/// A template with `FUZZ` needs a wordlist and yields one target per entry,
/// with the first `FUZZ` replaced. A wordlist without `FUZZ` is rejected.
pub fn build_targets(template: &str, wordlist: Option<&Path>) -> Result<Vec<Target>> {
    let template = template.trim();
    if template.is_empty() {
        return Err(Error::config("target URL is required"));
    }

    let has_fuzz = template.contains(FUZZ_MARKER);
    match (has_fuzz, wordlist) {
        (false, None) => Ok(vec![Target::new(template)]),
        (true, None) => Err(Error::config(
            "URL contains FUZZ but no wordlist was provided",
        )),
        (false, Some(_)) => Err(Error::config(
            "wordlist supplied but target URL has no FUZZ placeholder",
        )),
        (true, Some(path)) => {
            let targets: Vec<Target> = load_wordlist(path)?
                .into_iter()
                .map(|payload| {
                    Target::new(template.replacen(FUZZ_MARKER, &payload, 1)).with_payload(payload)
                })
                .collect();
            if targets.is_empty() {
                return Err(Error::wordlist(path, "produced no payloads"));
            }
            Ok(targets)
        }
    }
}

/// Read non-empty lines of a wordlist
pub fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    let content =
        fs::read_to_string(path).map_err(|e| Error::wordlist(path, e.to_string()))?;

    Ok(content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
