// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Resilient HTTP transport
//!
//! Never follows redirects, injects the configured headers and cookie on every
//! attempt, and retries network errors and 5xx responses with exponential
//! backoff.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use reqwest::redirect::Policy;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::request::Request;
use super::response::Response;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};

/// Backoff before the first retry; doubles per attempt
pub const BASE_BACKOFF: Duration = Duration::from_millis(100);

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Headers injected on every request, replacing caller values
    pub headers: HeaderMap,
    /// Cookie header injected on every request
    pub cookie: Option<String>,
    /// Proxy URL for all schemes
    pub proxy: Option<String>,
    /// Retries after the first attempt
    pub retries: u32,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(8),
            accept_invalid_certs: false,
            headers: HeaderMap::new(),
            cookie: None,
            proxy: None,
            retries: 1,
        }
    }
}

impl HttpClientConfig {
    /// Create a new client config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry count
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Add a fixed header
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let header_name = HeaderName::try_from(name)
            .map_err(|e| Error::invalid_header(name, e.to_string()))?;
        let header_value =
            HeaderValue::try_from(value).map_err(|e| Error::invalid_header(name, e.to_string()))?;
        self.headers.append(header_name, header_value);
        Ok(self)
    }

    /// Set cookie string
    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Set proxy URL
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Skip TLS certificate verification
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

/// HTTP client with manual redirect handling and retries
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    cookie_header: Option<HeaderValue>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .cookie_store(false);

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let cookie_header = match config.cookie.as_deref() {
            Some(cookie) if !cookie.is_empty() => Some(
                HeaderValue::from_str(cookie)
                    .map_err(|e| Error::invalid_header("cookie", e.to_string()))?,
            ),
            _ => None,
        };

        let client = builder.build()?;

        Ok(Self {
            client,
            config,
            cookie_header,
        })
    }

    /// Execute a GET request without external cancellation
    pub async fn get(&self, url: impl AsRef<str>) -> Result<Response> {
        self.send(&Request::get(url)?, &CancellationToken::new()).await
    }

    /// Send a request, retrying network errors and 5xx responses
    ///
    /// Makes at most `retries + 1` attempts. A 3xx is returned untouched. When
    /// retries run out the last response (5xx) or the last error is returned.
    pub async fn send(&self, request: &Request, cancel: &CancellationToken) -> Result<Response> {
        let start = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            let mut builder = self
                .client
                .request(request.method.clone(), request.url.clone())
                .headers(self.outbound_headers(request));

            if let Some(ref body) = request.body {
                builder = builder.body(body.for_attempt());
            }

            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }

            let outcome = builder.send().await.map_err(Error::from);
            let retryable = match &outcome {
                Ok(resp) => resp.status().as_u16() >= 500,
                Err(e) => e.is_recoverable(),
            };

            if !retryable || attempt >= self.config.retries {
                let elapsed = start.elapsed().as_millis() as u64;
                return match outcome {
                    Ok(resp) => Ok(Response::new(resp, request.url.clone(), elapsed, attempt + 1)),
                    Err(e) => Err(e),
                };
            }

            match &outcome {
                Ok(resp) => debug!(
                    url = %request.url,
                    status = resp.status().as_u16(),
                    attempt,
                    "Server error, retrying"
                ),
                Err(e) => debug!(url = %request.url, error = %e, attempt, "Send failed, retrying"),
            }
            // Closes any open body before sleeping
            drop(outcome);

            tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(backoff_for(attempt)) => {}
            }
            attempt += 1;
        }
    }

    /// Caller headers, then configured headers and cookie on top
    fn outbound_headers(&self, request: &Request) -> HeaderMap {
        let mut headers = request.headers.clone();
        for name in self.config.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in self.config.headers.iter() {
            headers.append(name.clone(), value.clone());
        }
        if let Some(ref cookie) = self.cookie_header {
            headers.insert(COOKIE, cookie.clone());
        }
        headers
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

/// `100ms * 2^attempt`, saturating
fn backoff_for(attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    BASE_BACKOFF.saturating_mul(factor)
}
