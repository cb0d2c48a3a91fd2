// ABOUTME: Main library entry point for TikTok Studio
// ABOUTME: Multi-account OAuth2/PKCE login and chunked video publishing for the TikTok Open API
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # TikTok Studio
//!
//! A small server that lets several TikTok accounts log in through OAuth 2.0
//! with PKCE, shows their profile and videos, and publishes videos through the
//! Content Posting API using chunked uploads.
//!
//! ## Architecture
//!
//! - **`OAuth2`**: PKCE pair, pending login session, token exchange and login flow
//! - **Credentials**: in-memory multi-account store with an active-account pointer
//! - **Providers**: platform API client and response envelope helpers
//! - **Upload**: capability gate, chunk plan, chunk transfer, status poll, orchestrator
//! - **Services**: cached profile and video reads
//! - **Routes**: axum JSON routes over all of the above
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use tiktok_studio::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("TikTok Studio configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// TTL cache for platform reads
pub mod cache;

/// Environment configuration
pub mod config;

/// Application constants
pub mod constants;

/// Logged-in accounts
pub mod credentials;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// OAuth 2.0 client side of the login
pub mod oauth2_client;

/// Page-number pagination
pub mod pagination;

/// Platform API client
pub mod providers;

/// Shared server resources
pub mod resources;

/// HTTP routes
pub mod routes;

/// Domain services
pub mod services;

/// Chunked video upload pipeline
pub mod upload;

/// Shared utilities
pub mod utils;
