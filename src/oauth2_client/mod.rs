// ABOUTME: OAuth 2.0 client side of the platform login with PKCE
// ABOUTME: Token exchange, pending-session store and the login flow built on them
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # OAuth 2.0 Client Module
//!
//! The server acts as an OAuth 2.0 client of the video platform. This module handles:
//! - PKCE pair generation and the authorize URL
//! - the single pending login session and its state check
//! - the authorization code exchange
//! - account switching over the credential store

/// Authorize URL, PKCE and token exchange
pub mod client;
/// Login flow over the session and credential stores
pub mod flow_manager;
/// Pending authorization session
pub mod session_store;

pub use client::{OAuth2Client, OAuth2Config, PkcePair, TokenGrant};
pub use flow_manager::LoginFlowManager;
pub use session_store::{AuthorizationSession, AuthorizationSessionStore};
