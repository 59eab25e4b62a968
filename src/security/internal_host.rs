// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Internal host classification
//!
//! Decides whether a host points into private, loopback or link-local address
//! space, or uses a name that only resolves inside a network.

use std::net::IpAddr;

use ipnet::IpNet;
use url::{Host, Url};

use crate::error::{Error, Result};

/// Address ranges treated as internal by default
pub const DEFAULT_INTERNAL_CIDRS: &[&str] = &[
    "10.0.0.0/8",
    "172.16.0.0/12",
    "192.168.0.0/16",
    "127.0.0.0/8",
    "169.254.0.0/16",
    "::1/128",
    "fc00::/7",
    "fe80::/10",
];

/// Classifies hosts as internal or external
#[derive(Debug, Clone)]
pub struct InternalHostClassifier {
    /// Internal networks
    networks: Vec<IpNet>,
    /// Exact internal host names (lowercase)
    names: Vec<String>,
    /// Internal name suffixes such as `.internal` (lowercase)
    suffixes: Vec<String>,
}

impl Default for InternalHostClassifier {
    fn default() -> Self {
        Self {
            networks: DEFAULT_INTERNAL_CIDRS
                .iter()
                .filter_map(|cidr| cidr.parse().ok())
                .collect(),
            names: vec!["localhost".to_string()],
            suffixes: vec![".internal".to_string()],
        }
    }
}

impl InternalHostClassifier {
    /// Classifier with the standard private ranges
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier that treats nothing as internal
    pub fn empty() -> Self {
        Self {
            networks: Vec::new(),
            names: Vec::new(),
            suffixes: Vec::new(),
        }
    }

    /// Add a network
    pub fn with_network(mut self, network: IpNet) -> Self {
        self.networks.push(network);
        self
    }

    /// Add a network in CIDR notation
    pub fn with_cidr(self, cidr: &str) -> Result<Self> {
        let network: IpNet = cidr
            .trim()
            .parse()
            .map_err(|e| Error::config(format!("invalid CIDR '{}': {}", cidr, e)))?;
        Ok(self.with_network(network))
    }

    /// Add an exact host name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into().to_ascii_lowercase());
        self
    }

    /// Add a host name suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffixes.push(suffix.into().to_ascii_lowercase());
        self
    }

    /// Configured networks
    pub fn networks(&self) -> &[IpNet] {
        &self.networks
    }

    /// Check an address against the internal networks
    pub fn is_internal_ip(&self, ip: IpAddr) -> bool {
        let ip = match ip {
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => IpAddr::V4(v4),
                None => ip,
            },
            v4 => v4,
        };
        self.networks.iter().any(|net| net.contains(&ip))
    }

    /// Check a host string, IP literal or name, brackets allowed
    pub fn is_internal_host(&self, host: &str) -> bool {
        let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
        let bare = host.trim_start_matches('[').trim_end_matches(']');

        if let Ok(ip) = bare.parse::<IpAddr>() {
            return self.is_internal_ip(ip);
        }

        self.is_internal_name(bare)
    }

    /// Check the host of a parsed URL
    pub fn is_internal_url(&self, url: &Url) -> bool {
        match url.host() {
            Some(Host::Ipv4(v4)) => self.is_internal_ip(IpAddr::V4(v4)),
            Some(Host::Ipv6(v6)) => self.is_internal_ip(IpAddr::V6(v6)),
            Some(Host::Domain(name)) => self.is_internal_host(name),
            None => false,
        }
    }

    fn is_internal_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name) || self.suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }
}
