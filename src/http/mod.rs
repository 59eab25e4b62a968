// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP transport layer for redirecthunter
//!
//! One request per call, no automatic redirects. Headers and cookies from the
//! scan configuration ride on every attempt.

mod client;
mod request;
mod response;

pub use client::{HttpClient, HttpClientConfig, BASE_BACKOFF};
pub use request::{BodyFactory, Request, RequestBody};
pub use response::Response;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 redirecthunter";
