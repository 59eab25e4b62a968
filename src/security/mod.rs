// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Security analysis modules
//!
//! - Internal host classification (SSRF targets)
//! - Base domain resolution
//! - Per-hop detectors

mod detectors;
mod domain;
mod internal_host;

pub use detectors::{Detectors, SENSITIVE_KEYS};
pub use domain::{base_domain, base_domain_of, base_domain_str, same_base_domain};
pub use internal_host::{InternalHostClassifier, DEFAULT_INTERNAL_CIDRS};
