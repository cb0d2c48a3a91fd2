// ABOUTME: OAuth2 client implementation for the video platform's authorization-code + PKCE flow
// ABOUTME: Generates PKCE pairs, builds authorize URLs and exchanges codes for normalized token grants
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::ServerConfig;
use crate::constants::{api, oauth};
use crate::errors::{AppError, AppResult};
use crate::providers::envelope;
use crate::utils::http_client::oauth_client;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use url::Url;

/// OAuth 2.0 client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    /// Client key from the developer portal
    pub client_key: String,
    /// Client secret from the developer portal
    #[serde(skip_serializing)]
    pub client_secret: String,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
    /// Redirect URI, sent byte-identical on authorize and exchange
    pub redirect_uri: String,
    /// OAuth scopes to request
    pub scopes: Vec<String>,
}

impl OAuth2Config {
    /// Build the client configuration from server settings
    #[must_use]
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            client_key: config.oauth.client_key.clone(),
            client_secret: config.oauth.client_secret.clone(),
            auth_url: config.oauth.auth_url.clone(),
            token_url: format!(
                "{}{}",
                config.platform.api_base_url.trim_end_matches('/'),
                api::TOKEN_PATH
            ),
            redirect_uri: config.oauth.redirect_uri.clone(),
            scopes: config.oauth.scopes.clone(),
        }
    }
}

/// `PKCE` (Proof Key for Code Exchange) verifier and challenge
///
/// The challenge is the lowercase hex SHA-256 of the verifier, which is what
/// the platform expects instead of the base64url form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    /// Randomly generated code verifier
    pub verifier: String,
    /// Hex-encoded SHA-256 of the verifier
    pub challenge: String,
}

impl PkcePair {
    /// Generate a fresh pair from a cryptographically secure source
    #[must_use]
    pub fn generate() -> Self {
        let chars = oauth::VERIFIER_ALPHABET;
        let mut rng = rand::thread_rng();
        let verifier: String = (0..oauth::CODE_VERIFIER_LENGTH)
            .map(|_| chars[rng.gen_range(0..chars.len())] as char)
            .collect();

        let challenge = Self::challenge_for(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    /// Compute the `S256` challenge for a verifier
    #[must_use]
    pub fn challenge_for(verifier: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Canonical token payload, whichever envelope shape the platform used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    /// Bearer token for API calls
    pub access_token: String,
    /// Stable user id within this client app
    pub open_id: String,
    /// Refresh token, if issued
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds
    pub expires_in: Option<u64>,
    /// Granted scopes, comma separated
    pub scope: Option<String>,
}

impl TokenGrant {
    /// Normalize a 200 token response
    ///
    /// The fields are read from the top level first, then from `data`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` if no non-empty `access_token` or no `open_id` is present
    pub fn from_payload(payload: &Value) -> AppResult<Self> {
        let Some(owner) = envelope::owner_of(payload, "access_token") else {
            if let Some(error) = envelope::platform_error(payload).filter(|e| !e.is_ok()) {
                return Err(AppError::malformed(format!(
                    "Token response has no access_token ({}: {})",
                    error.code, error.message
                )));
            }
            return Err(AppError::malformed("Token response has no access_token"));
        };

        let access_token = owner
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::malformed("access_token is not a string"))?
            .to_owned();

        // open_id normally sits next to access_token; accept the other location too
        let open_id = owner
            .get("open_id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .or_else(|| envelope::string_field(payload, "open_id"))
            .ok_or_else(|| AppError::malformed("Token response has no open_id"))?;

        Ok(Self {
            access_token,
            open_id,
            refresh_token: owner
                .get("refresh_token")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            expires_in: owner.get("expires_in").and_then(Value::as_u64),
            scope: owner
                .get("scope")
                .and_then(Value::as_str)
                .map(str::to_owned),
        })
    }
}

/// OAuth 2.0 client for the platform's authorization server
pub struct OAuth2Client {
    config: OAuth2Config,
    client: reqwest::Client,
}

impl OAuth2Client {
    /// Create a new `OAuth2` client with the given configuration
    #[must_use]
    pub fn new(config: OAuth2Config) -> Self {
        Self {
            config,
            client: oauth_client(),
        }
    }

    /// Get the `OAuth2` configuration
    #[must_use]
    pub const fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Build the authorize URL carrying the PKCE challenge
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configured authorize URL is malformed
    pub fn authorization_url(&self, state: &str, pkce: &PkcePair) -> AppResult<String> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AppError::config(format!("Invalid auth URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("client_key", &self.config.client_key)
            .append_pair("scope", &self.config.scopes.join(","))
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("state", state)
            .append_pair("code_challenge", &pkce.challenge)
            .append_pair("code_challenge_method", oauth::CODE_CHALLENGE_METHOD);

        Ok(url.to_string())
    }

    /// Exchange an authorization code and its verifier for a token grant
    ///
    /// No retry is attempted; authorization codes are single-use.
    ///
    /// # Errors
    ///
    /// - `NetworkTimeout` / `NetworkError` on transport failure
    /// - `TokenExchangeFailed` on any non-200 answer, carrying the upstream body verbatim
    /// - `MalformedResponse` when a 200 answer lacks the token fields
    pub async fn exchange_code(&self, code: &str, code_verifier: &str) -> AppResult<TokenGrant> {
        let params = [
            ("client_key", self.config.client_key.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_verifier", code_verifier),
        ];

        debug!(token_url = %self.config.token_url, "Exchanging authorization code");

        let response = self
            .client
            .post(&self.config.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::from_transport("Token exchange request failed", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::from_transport("Token exchange response unreadable", e))?;

        if status != reqwest::StatusCode::OK {
            warn!(status = status.as_u16(), "Token endpoint refused the exchange");
            return Err(AppError::token_exchange(status.as_u16(), body));
        }

        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| AppError::malformed(format!("Token response is not JSON: {e}")))?;

        TokenGrant::from_payload(&payload)
    }
}
