// ABOUTME: HTTP client builders with per-purpose timeout configuration
// ABOUTME: Separate clients for token exchange, platform API calls and chunk uploads
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::constants::timeouts;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Create a new HTTP client with custom timeout settings
///
/// Falls back to a default client if the builder fails.
#[must_use]
pub fn create_client_with_timeout(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Client for token exchanges, which should be fast
#[must_use]
pub fn oauth_client() -> Client {
    create_client_with_timeout(timeouts::OAUTH_REQUEST_SECS, timeouts::OAUTH_CONNECT_SECS)
}

/// Client for read and publish API calls
#[must_use]
pub fn api_client() -> Client {
    create_client_with_timeout(timeouts::API_REQUEST_SECS, timeouts::API_CONNECT_SECS)
}

/// Client for chunk PUTs; each request carries up to one chunk of video bytes
#[must_use]
pub fn upload_client() -> Client {
    create_client_with_timeout(timeouts::CHUNK_REQUEST_SECS, timeouts::API_CONNECT_SECS)
}
