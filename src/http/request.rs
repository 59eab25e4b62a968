// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request types

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use crate::error::{Error, Result};

/// Produces a fresh body for every attempt
pub type BodyFactory = Arc<dyn Fn() -> reqwest::Body + Send + Sync>;

/// Request body
///
/// `Fixed` bodies replay for free. `Streaming` bodies cannot be re-read once
/// sent, so the transport asks the factory for a new one on each attempt.
#[derive(Clone)]
pub enum RequestBody {
    /// In-memory body
    Fixed(Bytes),
    /// Body rebuilt per attempt
    Streaming(BodyFactory),
}

impl RequestBody {
    /// Produce the body for one attempt
    pub fn for_attempt(&self) -> reqwest::Body {
        match self {
            RequestBody::Fixed(bytes) => reqwest::Body::from(bytes.clone()),
            RequestBody::Streaming(factory) => factory(),
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Fixed(bytes) => write!(f, "Fixed({} bytes)", bytes.len()),
            RequestBody::Streaming(_) => write!(f, "Streaming(..)"),
        }
    }
}

/// HTTP request representation
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: Url,
    /// Caller headers; configured client headers win over these
    pub headers: HeaderMap,
    /// Request body
    pub body: Option<RequestBody>,
    /// Per-request timeout override
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a new GET request
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Create a new request with arbitrary method
    pub fn new(method: Method, url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url.as_ref())?,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        })
    }

    /// Set a header, replacing earlier values
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let header_name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::invalid_header(name.as_ref(), e.to_string()))?;
        let header_value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::invalid_header(name.as_ref(), e.to_string()))?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Set a replayable body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Fixed(body.into()));
        self
    }

    /// Set a streaming body rebuilt by `factory` on every attempt
    pub fn body_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> reqwest::Body + Send + Sync + 'static,
    {
        self.body = Some(RequestBody::Streaming(Arc::new(factory)));
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let req = Request::get("https://example.com/path").unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.host_str(), Some("example.com"));
        assert!(req.body.is_none());
    }

    #[test]
    fn test_request_headers() {
        let req = Request::get("https://example.com")
            .unwrap()
            .header("x-custom", "value")
            .unwrap();
        assert_eq!(
            req.headers.get("x-custom").map(|v| v.to_str().unwrap()),
            Some("value")
        );
    }

    #[test]
    fn test_invalid_header_name() {
        let err = Request::get("https://example.com")
            .unwrap()
            .header("bad header", "v")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { .. }));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(Request::get("not a url"), Err(Error::Url(_))));
    }

    #[test]
    fn test_body_factory_called_per_attempt() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let req = Request::new(Method::POST, "https://example.com")
            .unwrap()
            .body_factory(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                reqwest::Body::from("payload")
            });

        let body = req.body.as_ref().unwrap();
        let _ = body.for_attempt();
        let _ = body.for_attempt();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
