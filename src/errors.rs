// ABOUTME: Unified error type and error codes for login, platform API and upload failures
// ABOUTME: Converts transport errors at component boundaries and renders JSON error responses
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Unified Error Handling System
//!
//! Every failure that crosses a component boundary (token exchange, capability
//! fetch, upload init, chunk transfer) is converted into an [`AppError`] carrying
//! one [`ErrorCode`]. Raw `reqwest` errors never escape the exchanger or the
//! upload orchestrator.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// CSRF state mismatch or missing verifier; the user must restart the login
    InvalidState,
    /// Rejected before any network call (empty title, no file selected)
    InvalidInput,
    /// Transport failure talking to the platform
    NetworkError,
    /// Platform call exceeded its timeout
    NetworkTimeout,
    /// Token endpoint answered with a non-200 status
    TokenExchangeFailed,
    /// Platform answered 200 but the payload lacks required fields
    MalformedResponse,
    /// Access token lacks the Content Posting scope
    InsufficientScope,
    /// Platform rate limit hit
    RateLimited,
    /// Creator info could not be fetched
    CapabilityFetchFailed,
    /// Upload initialization was refused or incomplete
    InitializationFailed,
    /// A chunk PUT failed; the job is aborted
    ChunkTransferFailed,
    /// Unknown account or resource
    ResourceNotFound,
    /// Configuration is missing or invalid
    ConfigError,
    /// Anything else
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidState | Self::InvalidInput => 400,
            Self::InsufficientScope => 403,
            Self::ResourceNotFound => 404,
            Self::RateLimited => 429,
            Self::NetworkError
            | Self::TokenExchangeFailed
            | Self::MalformedResponse
            | Self::CapabilityFetchFailed
            | Self::InitializationFailed
            | Self::ChunkTransferFailed => 502,
            Self::NetworkTimeout => 504,
            Self::ConfigError | Self::InternalError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidState => "Login session is invalid or has expired, please log in again",
            Self::InvalidInput => "The provided input is invalid",
            Self::NetworkError => "Could not reach the platform",
            Self::NetworkTimeout => "The platform did not answer in time, please retry later",
            Self::TokenExchangeFailed => "The platform refused the authorization code",
            Self::MalformedResponse => "The platform returned an unexpected response",
            Self::InsufficientScope => {
                "Content Posting API permission is missing, enable it in the app settings"
            }
            Self::RateLimited => "Platform rate limit reached, please wait before retrying",
            Self::CapabilityFetchFailed => "Creator information could not be retrieved",
            Self::InitializationFailed => "Upload initialization failed",
            Self::ChunkTransferFailed => "Uploading the video file failed",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reuse the serde name so logs and JSON bodies agree
        let name = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default();
        f.write_str(&name)
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Publish id obtained before the failure, kept for out-of-band status queries
    pub publish_id: Option<String>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            publish_id: None,
            source: None,
        }
    }

    /// Attach the publish id known at the time of failure
    #[must_use]
    pub fn with_publish_id(mut self, publish_id: impl Into<String>) -> Self {
        self.publish_id = Some(publish_id.into());
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Convert a `reqwest` transport failure into `NetworkTimeout` or `NetworkError`
    #[must_use]
    pub fn from_transport(context: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::new(
                ErrorCode::NetworkTimeout,
                format!("{context}: request timed out"),
            )
            .with_source(error)
        } else {
            Self::new(ErrorCode::NetworkError, format!("{context}: {error}")).with_source(error)
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Machine-readable code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Partial publish id, when the failure happened after upload init
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_id: Option<String>,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                publish_id: error.publish_id,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

/// Convenience functions for creating common errors
impl AppError {
    /// State mismatch, missing or already consumed login session
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, message)
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Token endpoint refused the exchange; `body` is the upstream error body verbatim
    pub fn token_exchange(status: u16, body: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::TokenExchangeFailed,
            format!("Token Error ({status}): {}", body.into()),
        )
    }

    /// Malformed platform payload
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedResponse, message)
    }

    /// Missing Content Posting API scope
    pub fn insufficient_scope(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InsufficientScope, message)
    }

    /// Platform rate limit
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, message)
    }

    /// Creator info fetch failure
    pub fn capability_fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CapabilityFetchFailed, message)
    }

    /// Upload initialization failure
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InitializationFailed, message)
    }

    /// Chunk transfer failure
    pub fn chunk_transfer(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ChunkTransferFailed, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

/// Conversion from `std::io::Error` (local file access during uploads)
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::new(ErrorCode::InternalError, format!("I/O error: {error}")).with_source(error)
    }
}
