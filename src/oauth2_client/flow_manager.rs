// ABOUTME: Login flow for platform accounts: authorize redirect, callback handling, account switching
// ABOUTME: Ties the PKCE session store, token exchange, profile lookup and credential store together
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::client::{OAuth2Client, OAuth2Config};
use super::session_store::AuthorizationSessionStore;
use crate::config::ServerConfig;
use crate::credentials::{Credential, CredentialStore};
use crate::errors::{AppError, AppResult};
use crate::logging::{redact, AppLogger};
use crate::providers::tiktok::TikTokApiClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Drives the login flow and manages the set of logged-in accounts
pub struct LoginFlowManager {
    client: OAuth2Client,
    sessions: AuthorizationSessionStore,
    credentials: Arc<CredentialStore>,
    api: TikTokApiClient,
    fixed_state: Option<String>,
    session_lifetime_secs: u64,
}

impl LoginFlowManager {
    /// Build the flow from configuration, sharing `credentials` with the rest of the server
    #[must_use]
    pub fn new(
        config: &ServerConfig,
        credentials: Arc<CredentialStore>,
        api: TikTokApiClient,
    ) -> Self {
        Self {
            client: OAuth2Client::new(OAuth2Config::from_server_config(config)),
            sessions: AuthorizationSessionStore::new(Duration::from_secs(
                config.oauth.session_lifetime_secs,
            )),
            credentials,
            api,
            fixed_state: config.oauth.fixed_state.clone(),
            session_lifetime_secs: config.oauth.session_lifetime_secs,
        }
    }

    /// Begin a login and return the URL to redirect the browser to
    ///
    /// The state token is `state` if given, else the configured fixed state,
    /// else a fresh nonce. Any active account is deselected first.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization URL is invalid
    pub async fn start_login(&self, state: Option<&str>) -> AppResult<String> {
        let state_token = state
            .map(str::to_owned)
            .or_else(|| self.fixed_state.clone())
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        self.credentials.clear_active().await;
        let pkce = self.sessions.start(&state_token).await;
        let url = self.client.authorization_url(&state_token, &pkce)?;

        info!(state = %redact(&state_token), "Login started");
        Ok(url)
    }

    /// Finish a login from the callback's `code` and `state`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty code, `InvalidState` for an unknown or
    /// expired state, `MalformedResponse` when the granted token is already
    /// expired, and token exchange errors as they come
    pub async fn complete_login(&self, code: &str, state: &str) -> AppResult<Credential> {
        if code.trim().is_empty() {
            return Err(AppError::invalid_input("Authorization code is missing"));
        }

        let verifier = match self.sessions.consume(state).await {
            Ok(verifier) => verifier,
            Err(e) => {
                AppLogger::log_auth_event("", "login", false, Some(&e.message));
                return Err(e);
            }
        };

        let grant = match self.client.exchange_code(code, &verifier).await {
            Ok(grant) => grant,
            Err(e) => {
                AppLogger::log_auth_event("", "token_exchange", false, Some(&e.message));
                return Err(e);
            }
        };

        let (display_name, avatar_url) = match self.api.user_info(&grant.access_token).await {
            Ok(profile) => (profile.display_name, profile.avatar_url),
            Err(e) => {
                warn!(user.open_id = %grant.open_id, error = %e, "Profile lookup after login failed");
                (None, None)
            }
        };

        let credential = self.credentials.upsert(Credential::from_grant(
            &grant,
            display_name,
            avatar_url,
            self.session_lifetime_secs,
        ));
        if !self.credentials.set_active(&credential.open_id).await {
            let message = "Token response grants an already expired session";
            AppLogger::log_auth_event(&credential.open_id, "login", false, Some(message));
            return Err(AppError::malformed(message));
        }

        AppLogger::log_auth_event(&credential.open_id, "login", true, None);
        Ok(credential)
    }

    /// The active account, if it is still live
    pub async fn get_active_credential(&self) -> Option<Credential> {
        self.credentials.get_active().await
    }

    /// Make `open_id` the active account
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no live account has that id
    pub async fn switch_user(&self, open_id: &str) -> AppResult<Credential> {
        if !self.credentials.set_active(open_id).await {
            AppLogger::log_auth_event(open_id, "switch", false, Some("unknown account"));
            return Err(AppError::not_found(format!("Account {open_id}")));
        }
        AppLogger::log_auth_event(open_id, "switch", true, None);
        self.credentials
            .get(open_id)
            .await
            .ok_or_else(|| AppError::not_found(format!("Account {open_id}")))
    }

    /// Forget an account; returns whether it existed
    pub async fn remove_user(&self, open_id: &str) -> bool {
        let removed = self.credentials.remove(open_id).await;
        AppLogger::log_auth_event(open_id, "remove", removed, None);
        removed
    }

    /// Remove the active account and return its id
    pub async fn logout(&self) -> Option<String> {
        let open_id = self.credentials.active_open_id().await?;
        self.remove_user(&open_id).await;
        Some(open_id)
    }

    /// All live accounts
    pub async fn accounts(&self) -> Vec<Credential> {
        self.credentials.list().await
    }

    /// Whether a login is waiting for its callback
    pub async fn has_pending_login(&self) -> bool {
        self.sessions.has_pending().await
    }
}
