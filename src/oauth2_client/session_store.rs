// ABOUTME: Pending authorization session holding the CSRF state and PKCE verifier between redirects
// ABOUTME: Single-slot store with constant-time state comparison and take-on-success semantics
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Authorization session store
//!
//! At most one login is pending per process. Starting a new login replaces
//! the pending one, so an older callback fails its state check.

use super::client::PkcePair;
use crate::errors::{AppError, AppResult};
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A login in progress
#[derive(Debug, Clone)]
pub struct AuthorizationSession {
    /// CSRF state sent on the authorize URL
    pub state_token: String,
    /// PKCE verifier, needed for the exchange
    pub verifier: String,
    /// When the login started
    pub created_at: Instant,
}

/// Single-slot store for the pending authorization session
pub struct AuthorizationSessionStore {
    pending: Mutex<Option<AuthorizationSession>>,
    lifetime: Duration,
}

impl AuthorizationSessionStore {
    /// Create a store whose pending sessions expire after `lifetime`
    #[must_use]
    pub fn new(lifetime: Duration) -> Self {
        Self {
            pending: Mutex::new(None),
            lifetime,
        }
    }

    /// Begin a login: generate a PKCE pair and replace any pending session
    pub async fn start(&self, state_token: &str) -> PkcePair {
        let pkce = PkcePair::generate();
        let mut pending = self.pending.lock().await;
        if pending.is_some() {
            debug!("Replacing pending authorization session");
        }
        *pending = Some(AuthorizationSession {
            state_token: state_token.to_owned(),
            verifier: pkce.verifier.clone(),
            created_at: Instant::now(),
        });
        pkce
    }

    /// Validate the callback state and hand out the verifier exactly once
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when nothing is pending, the pending session has
    /// expired, or the state does not match. A mismatch leaves the pending
    /// session in place.
    pub async fn consume(&self, state_token: &str) -> AppResult<String> {
        let mut pending = self.pending.lock().await;

        let Some(session) = pending.as_ref() else {
            warn!("OAuth callback without a pending login");
            return Err(AppError::invalid_state("No login in progress"));
        };

        if session.created_at.elapsed() >= self.lifetime {
            pending.take();
            warn!("OAuth callback for an expired login");
            return Err(AppError::invalid_state("Login session expired"));
        }

        let matches: bool = session
            .state_token
            .as_bytes()
            .ct_eq(state_token.as_bytes())
            .into();
        if !matches {
            warn!("OAuth callback state mismatch");
            return Err(AppError::invalid_state("State parameter mismatch"));
        }

        pending
            .take()
            .map(|s| s.verifier)
            .ok_or_else(|| AppError::invalid_state("No login in progress"))
    }

    /// Whether a login is currently pending (expired sessions count as absent)
    pub async fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .await
            .as_ref()
            .is_some_and(|s| s.created_at.elapsed() < self.lifetime)
    }
}
