// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use bytes::{Bytes, BytesMut};
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::StatusCode;
use url::Url;

use crate::error::Result;

/// HTTP response with an unread body
///
/// The body stays on the wire until [`Response::read_limited`] is called, so a
/// redirect hop never downloads more than its headers.
#[derive(Debug)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// URL that was actually dispatched
    pub url: Url,
    /// Time spent across all attempts in milliseconds
    pub response_time_ms: u64,
    /// Number of attempts the transport made
    pub attempts: u32,
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(
        inner: reqwest::Response,
        url: Url,
        response_time_ms: u64,
        attempts: u32,
    ) -> Self {
        Self {
            status: inner.status(),
            headers: inner.headers().clone(),
            url,
            response_time_ms,
            attempts,
            inner,
        }
    }

    /// Check if status is redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get the `Location` header, if present and non-empty
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Declared content length, if the server sent one
    pub fn content_length(&self) -> Option<u64> {
        self.inner.content_length()
    }

    /// Read at most `limit` bytes of the body and drop the rest of the stream
    pub async fn read_limited(mut self, limit: usize) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(limit.min(64 * 1024));
        while buf.len() < limit {
            match self.inner.chunk().await? {
                Some(chunk) => {
                    let take = (limit - buf.len()).min(chunk.len());
                    buf.extend_from_slice(&chunk[..take]);
                }
                None => break,
            }
        }
        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpClient, HttpClientConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_read_limited_truncates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![b'a'; 4096], "text/html"))
            .mount(&server)
            .await;

        let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();
        let resp = client.get(format!("{}/big", server.uri())).await.unwrap();

        assert_eq!(resp.content_type(), Some("text/html"));
        let body = resp.read_limited(100).await.unwrap();
        assert_eq!(body.len(), 100);
    }

    #[tokio::test]
    async fn test_location_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/go"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/next"))
            .mount(&server)
            .await;

        let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();
        let resp = client.get(format!("{}/go", server.uri())).await.unwrap();

        assert!(resp.is_redirect());
        assert_eq!(resp.location(), Some("/next"));
        assert_eq!(resp.url.path(), "/go");
    }
}
