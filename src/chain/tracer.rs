// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Redirect chain tracer
//!
//! Walks a target hop by hop without automatic redirects. Each response is
//! either a 3xx with a resolvable `Location`, an HTML page that redirects from
//! its body, or the end of the chain. Detectors run after every hop.

use std::collections::HashSet;
use std::time::Instant;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use super::scanner::{BodyRedirectScanner, MAX_BODY_SCAN_BYTES};
use super::{Finding, FindingKind, Hop, Severity, TraceResult, Via};
use crate::http::{HttpClient, Request};
use crate::security::Detectors;

/// Tracer options
#[derive(Debug, Clone)]
pub struct TraceOptions {
    /// Maximum hop indices per chain, synthetic hops included
    pub max_chain: usize,
    /// Follow meta refresh and JS redirects
    pub js_scan: bool,
    /// Most bytes of an HTML body read per hop
    pub body_limit: usize,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            max_chain: 15,
            js_scan: true,
            body_limit: MAX_BODY_SCAN_BYTES,
        }
    }
}

impl TraceOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum chain length
    pub fn max_chain(mut self, max_chain: usize) -> Self {
        self.max_chain = max_chain;
        self
    }

    /// Enable or disable body redirect following
    pub fn js_scan(mut self, enabled: bool) -> Self {
        self.js_scan = enabled;
        self
    }

    /// Set body read limit
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

/// Redirect chain tracer
#[derive(Clone)]
pub struct Tracer {
    client: HttpClient,
    detectors: Detectors,
    scanner: BodyRedirectScanner,
    options: TraceOptions,
}

impl Tracer {
    /// Create a tracer
    pub fn new(client: HttpClient, detectors: Detectors, options: TraceOptions) -> Self {
        Self {
            client,
            detectors,
            scanner: BodyRedirectScanner::new(),
            options,
        }
    }

    /// Tracer options
    pub fn options(&self) -> &TraceOptions {
        &self.options
    }

    /// Transport in use
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Trace the redirect chain of `target`
    ///
    /// Never fails: transport and URL errors end the chain and land in
    /// `TraceResult::error`.
    pub async fn trace(&self, target: &str, cancel: &CancellationToken) -> TraceResult {
        let started = Instant::now();
        let max_chain = self.options.max_chain;

        let mut result = TraceResult::new(target);
        // Normalised like the joined hop URLs the visited set is keyed on
        let mut current = Url::parse(target)
            .map(String::from)
            .unwrap_or_else(|_| target.to_string());
        let mut visited: HashSet<String> = HashSet::new();
        let mut prev: Option<Url> = None;
        let mut index = 0usize;
        let mut ended = false;

        while index < max_chain {
            if !visited.insert(current.clone()) {
                result.findings.push(Finding::core(
                    FindingKind::ChainLoop,
                    Severity::Info,
                    index,
                    current.clone(),
                ));
                ended = true;
                break;
            }

            let request = match Request::get(&current) {
                Ok(request) => request,
                Err(e) => {
                    result.error = Some(e.to_string());
                    ended = true;
                    break;
                }
            };

            let response = match self.client.send(&request, cancel).await {
                Ok(response) => response,
                Err(e) => {
                    debug!(url = %current, error = %e, "Hop failed");
                    result.error = Some(e.to_string());
                    ended = true;
                    break;
                }
            };

            let dispatched = response.url.clone();
            let mut hop = Hop {
                index,
                url: current.clone(),
                method: request.method.to_string(),
                status: response.status_code(),
                via: Via::HttpLocation,
                time_ms: response.response_time_ms,
                size: response.content_length().unwrap_or(0),
                is_final: false,
            };
            debug!(index, url = %current, status = hop.status, "Hop");

            self.check_url(&mut result, &dispatched, index);
            if let Some(ref prev_url) = prev {
                result
                    .findings
                    .extend(self.detectors.https_downgrade(prev_url, &dispatched, index));
            }

            if response.is_redirect() {
                let next = response
                    .location()
                    .and_then(|location| dispatched.join(location).ok());
                match next {
                    Some(next) => {
                        result.chain.push(hop);
                        prev = Some(dispatched);
                        current = next.to_string();
                        index += 1;
                        continue;
                    }
                    None => {
                        hop.is_final = true;
                        result.chain.push(hop);
                        ended = true;
                        break;
                    }
                }
            }

            if !self.scanner.should_inspect(response.content_type()) {
                hop.is_final = true;
                result.chain.push(hop);
                ended = true;
                break;
            }

            let body = match response.read_limited(self.options.body_limit).await {
                Ok(body) => body,
                Err(e) => {
                    debug!(url = %current, error = %e, "Body read failed");
                    Bytes::new()
                }
            };
            hop.size = body.len() as u64;
            result
                .findings
                .extend(self.detectors.phishing_indicator(&body, index));

            let redirect = if self.options.js_scan {
                self.scanner.detect(&body, &dispatched)
            } else {
                None
            };
            let Some(redirect) = redirect else {
                hop.is_final = true;
                result.chain.push(hop);
                ended = true;
                break;
            };

            result.chain.push(hop);
            index += 1;
            if index >= max_chain {
                result.findings.push(Finding::core(
                    FindingKind::ChainTooLong,
                    Severity::Info,
                    index,
                    format!("{} redirect to {} exceeds the chain limit", redirect.via, redirect.url),
                ));
                ended = true;
                break;
            }

            debug!(index, url = %redirect.url, via = %redirect.via, "Body redirect");
            result.chain.push(Hop {
                index,
                url: redirect.url.to_string(),
                method: request.method.to_string(),
                status: 0,
                via: redirect.via,
                time_ms: 0,
                size: body.len() as u64,
                is_final: false,
            });
            self.check_url(&mut result, &redirect.url, index);

            prev = Some(dispatched);
            current = redirect.url.to_string();
            index += 1;
        }

        if !ended {
            result.findings.push(Finding::core(
                FindingKind::ChainTooLong,
                Severity::Info,
                max_chain,
                format!("no final hop within {} hops", max_chain),
            ));
        }

        result.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            url = %result.target,
            hops = result.chain.len(),
            findings = result.findings.len(),
            error = result.error.as_deref().unwrap_or(""),
            duration_ms = result.duration_ms,
            "Trace finished"
        );
        result
    }

    fn check_url(&self, result: &mut TraceResult, url: &Url, index: usize) {
        result.findings.extend(self.detectors.ssrf(url, index));
        result
            .findings
            .extend(self.detectors.token_leakage(url, index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{classify, Classification};
    use crate::http::HttpClientConfig;
    use crate::security::InternalHostClassifier;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tracer_with(classifier: InternalHostClassifier, options: TraceOptions) -> Tracer {
        let client = HttpClient::with_config(HttpClientConfig::new().retries(0)).unwrap();
        Tracer::new(client, Detectors::new(classifier), options)
    }

    fn tracer(options: TraceOptions) -> Tracer {
        tracer_with(InternalHostClassifier::empty(), options)
    }

    async fn redirect(server: &MockServer, from: &str, to: &str) {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", to))
            .mount(server)
            .await;
    }

    async fn page(server: &MockServer, at: &str, status: u16, body: &str, content_type: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(
                ResponseTemplate::new(status).set_body_raw(body.as_bytes().to_vec(), content_type),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_single_ok() {
        let server = MockServer::start().await;
        page(&server, "/", 200, "hello", "text/plain").await;

        let result = tracer(TraceOptions::default())
            .trace(&server.uri(), &CancellationToken::new())
            .await;

        assert!(result.error.is_none());
        assert_eq!(result.chain.len(), 1);
        assert!(result.chain[0].is_final);
        assert_eq!(result.chain[0].status, 200);
        assert_eq!(result.chain[0].size, 5);
        assert!(result.findings.is_empty());
        assert_eq!(classify(&result), Classification::Ok);
    }

    #[tokio::test]
    async fn test_same_site_chain() {
        let server = MockServer::start().await;
        redirect(&server, "/a", "/b").await;
        redirect(&server, "/b", "/c").await;
        page(&server, "/c", 200, "done", "text/plain").await;

        let result = tracer(TraceOptions::default())
            .trace(&format!("{}/a", server.uri()), &CancellationToken::new())
            .await;

        assert_eq!(result.chain.len(), 3);
        let statuses: Vec<u16> = result.chain.iter().map(|h| h.status).collect();
        assert_eq!(statuses, vec![302, 302, 200]);
        let indices: Vec<usize> = result.chain.iter().map(|h| h.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(!result.chain[0].is_final);
        assert!(result.chain[2].is_final);
        assert!(result.chain[2].url.ends_with("/c"));
        assert_eq!(classify(&result), Classification::SameSiteRedirect);
    }

    #[tokio::test]
    async fn test_loop_detected() {
        let server = MockServer::start().await;
        redirect(&server, "/loop", "/loop").await;

        let result = tracer(TraceOptions::new().max_chain(3))
            .trace(&format!("{}/loop", server.uri()), &CancellationToken::new())
            .await;

        assert!(result.chain.len() <= 3);
        let loops: Vec<&Finding> = result
            .findings
            .iter()
            .filter(|f| f.kind == FindingKind::ChainLoop)
            .collect();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].severity, Severity::Info);
        assert!(!result.has_finding(&FindingKind::ChainTooLong));
    }

    #[tokio::test]
    async fn test_self_redirect_on_bare_origin() {
        let server = MockServer::start().await;
        redirect(&server, "/", "/").await;

        let result = tracer(TraceOptions::default())
            .trace(&server.uri(), &CancellationToken::new())
            .await;

        assert_eq!(result.target, server.uri());
        assert_eq!(result.chain.len(), 1);
        assert_eq!(result.chain[0].url, format!("{}/", server.uri()));
        let looped = result
            .findings
            .iter()
            .find(|f| f.kind == FindingKind::ChainLoop)
            .unwrap();
        assert_eq!(looped.at_hop, 1);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_chain_too_long() {
        let server = MockServer::start().await;
        redirect(&server, "/r1", "/r2").await;
        redirect(&server, "/r2", "/r3").await;
        redirect(&server, "/r3", "/r4").await;
        page(&server, "/r4", 200, "", "text/plain").await;

        let result = tracer(TraceOptions::new().max_chain(3))
            .trace(&format!("{}/r1", server.uri()), &CancellationToken::new())
            .await;

        assert_eq!(result.chain.len(), 3);
        assert!(result.chain.iter().all(|h| !h.is_final));
        let too_long: Vec<&Finding> = result
            .findings
            .iter()
            .filter(|f| f.kind == FindingKind::ChainTooLong)
            .collect();
        assert_eq!(too_long.len(), 1);
        assert_eq!(too_long[0].at_hop, 3);
    }

    #[tokio::test]
    async fn test_ssrf_at_first_internal_hop() {
        let server = MockServer::start().await;
        let port = server.address().port();
        redirect(&server, "/start", &format!("http://127.0.0.1:{}/admin", port)).await;
        page(&server, "/admin", 200, "secret", "text/plain").await;

        let classifier = InternalHostClassifier::empty()
            .with_cidr("127.0.0.0/8")
            .unwrap();
        let result = tracer_with(classifier, TraceOptions::default())
            .trace(
                &format!("http://localhost:{}/start", port),
                &CancellationToken::new(),
            )
            .await;

        assert!(result.error.is_none(), "{:?}", result.error);
        let ssrf: Vec<&Finding> = result
            .findings
            .iter()
            .filter(|f| f.kind == FindingKind::Ssrf)
            .collect();
        assert_eq!(ssrf.len(), 1);
        assert_eq!(ssrf[0].severity, Severity::High);
        assert_eq!(ssrf[0].at_hop, 1);
    }

    #[tokio::test]
    async fn test_token_leak_in_query_and_fragment() {
        let server = MockServer::start().await;
        redirect(&server, "/q", "/cb?access_token=abc").await;
        redirect(&server, "/f", "/cb#access_token=abc").await;
        page(&server, "/cb", 200, "", "text/plain").await;

        let t = tracer(TraceOptions::default());

        let query = t
            .trace(&format!("{}/q", server.uri()), &CancellationToken::new())
            .await;
        let leak = query
            .findings
            .iter()
            .find(|f| f.kind == FindingKind::TokenLeak)
            .unwrap();
        assert_eq!(leak.severity, Severity::Medium);
        assert_eq!(leak.at_hop, 1);

        let fragment = t
            .trace(&format!("{}/f", server.uri()), &CancellationToken::new())
            .await;
        let leak = fragment
            .findings
            .iter()
            .find(|f| f.kind == FindingKind::TokenLeak)
            .unwrap();
        assert_eq!(leak.severity, Severity::High);
        assert_eq!(leak.at_hop, 1);
    }

    #[tokio::test]
    async fn test_meta_refresh_synthetic_hop() {
        let server = MockServer::start().await;
        page(
            &server,
            "/page",
            200,
            r#"<html><meta http-equiv="refresh" content="0;url=/final"></html>"#,
            "text/html",
        )
        .await;
        page(&server, "/final", 200, "landed", "text/plain").await;

        let result = tracer(TraceOptions::default())
            .trace(&format!("{}/page", server.uri()), &CancellationToken::new())
            .await;

        assert_eq!(result.chain.len(), 3);
        let synthetic = &result.chain[1];
        assert_eq!(synthetic.index, 1);
        assert_eq!(synthetic.status, 0);
        assert_eq!(synthetic.via, Via::MetaRefresh);
        assert_eq!(synthetic.url, format!("{}/final", server.uri()));
        assert!(!result.chain[0].is_final);
        assert_eq!(result.chain[2].index, 2);
        assert!(result.chain[2].is_final);
    }

    #[tokio::test]
    async fn test_body_redirect_ignored_without_js_scan() {
        let server = MockServer::start().await;
        page(
            &server,
            "/page",
            200,
            r#"<script>window.location = "/final";</script>"#,
            "text/html",
        )
        .await;

        let result = tracer(TraceOptions::new().js_scan(false))
            .trace(&format!("{}/page", server.uri()), &CancellationToken::new())
            .await;

        assert_eq!(result.chain.len(), 1);
        assert!(result.chain[0].is_final);
    }

    #[tokio::test]
    async fn test_synthetic_hop_without_budget() {
        let server = MockServer::start().await;
        page(
            &server,
            "/page",
            200,
            r#"<script>location.href = "/next";</script>"#,
            "text/html",
        )
        .await;

        let result = tracer(TraceOptions::new().max_chain(1))
            .trace(&format!("{}/page", server.uri()), &CancellationToken::new())
            .await;

        assert_eq!(result.chain.len(), 1);
        let too_long: Vec<&Finding> = result
            .findings
            .iter()
            .filter(|f| f.kind == FindingKind::ChainTooLong)
            .collect();
        assert_eq!(too_long.len(), 1);
        assert_eq!(too_long[0].at_hop, 1);
    }

    #[tokio::test]
    async fn test_missing_location_is_final() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nowhere"))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;

        let result = tracer(TraceOptions::default())
            .trace(&format!("{}/nowhere", server.uri()), &CancellationToken::new())
            .await;

        assert_eq!(result.chain.len(), 1);
        assert!(result.chain[0].is_final);
        assert_eq!(result.chain[0].status, 302);
    }

    #[tokio::test]
    async fn test_phishing_page() {
        let server = MockServer::start().await;
        page(
            &server,
            "/login",
            200,
            r#"<form action="/steal"><input type="password" name="pw"></form>"#,
            "text/html; charset=utf-8",
        )
        .await;

        let result = tracer(TraceOptions::default())
            .trace(&format!("{}/login", server.uri()), &CancellationToken::new())
            .await;

        let finding = result
            .findings
            .iter()
            .find(|f| f.kind == FindingKind::PhishingIndicator)
            .unwrap();
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.at_hop, 0);
    }

    #[tokio::test]
    async fn test_transport_error_recorded() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let result = tracer(TraceOptions::default())
            .trace(&format!("http://127.0.0.1:{}/", port), &CancellationToken::new())
            .await;

        assert!(result.error.is_some());
        assert!(result.chain.is_empty());
        assert_eq!(classify(&result), Classification::Error);
    }

    #[tokio::test]
    async fn test_invalid_target() {
        let result = tracer(TraceOptions::default())
            .trace("not a url", &CancellationToken::new())
            .await;

        assert!(result.error.is_some());
        assert!(result.chain.is_empty());
        assert!(result.findings.is_empty());
    }
}
