// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses platform credentials, endpoints, upload policy and cache settings from env vars
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Environment-based configuration

use crate::constants::{api, cache, oauth, upload};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

/// Default HTTP port, matching the port registered with the redirect URI
pub const DEFAULT_HTTP_PORT: u16 = 3456;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational (default)
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// OAuth application registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthAppConfig {
    /// Client key issued by the developer portal
    pub client_key: String,
    /// Client secret issued by the developer portal
    #[serde(skip_serializing)]
    pub client_secret: String,
    /// Redirect URI, used verbatim for both authorize and token exchange
    pub redirect_uri: String,
    /// Authorize endpoint
    pub auth_url: String,
    /// Requested scopes
    pub scopes: Vec<String>,
    /// Fixed state value; `None` generates a nonce per login
    pub fixed_state: Option<String>,
    /// Lifetime of a pending login and of a stored credential, in seconds
    pub session_lifetime_secs: u64,
}

/// Platform endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// REST API base URL (token, user, video and publish endpoints)
    pub api_base_url: String,
    /// Public web base URL for profile links
    pub profile_base_url: String,
}

/// Upload policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Wait before querying publish status, in seconds
    pub status_settle_delay_secs: u64,
    /// Largest accepted video
    pub max_upload_bytes: u64,
}

/// Read-through cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Profile entry TTL in seconds
    pub profile_ttl_secs: u64,
    /// Video entry TTL in seconds
    pub video_ttl_secs: u64,
    /// LRU capacity
    pub max_entries: usize,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// OAuth application settings
    pub oauth: OAuthAppConfig,
    /// Platform endpoints
    pub platform: PlatformConfig,
    /// Upload policy
    pub upload: UploadConfig,
    /// Cache settings
    pub cache: CacheSettings,
}

impl ServerConfig {
    /// Configuration with default endpoints and policies for the given app credentials
    #[must_use]
    pub fn with_credentials(client_key: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            log_level: LogLevel::default(),
            environment: Environment::default(),
            oauth: OAuthAppConfig {
                client_key: client_key.into(),
                client_secret: client_secret.into(),
                redirect_uri: oauth::DEFAULT_REDIRECT_URI.to_owned(),
                auth_url: oauth::DEFAULT_AUTH_URL.to_owned(),
                scopes: parse_scopes(oauth::DEFAULT_SCOPES),
                fixed_state: None,
                session_lifetime_secs: oauth::DEFAULT_SESSION_LIFETIME_SECS,
            },
            platform: PlatformConfig {
                api_base_url: api::DEFAULT_BASE_URL.to_owned(),
                profile_base_url: api::DEFAULT_PROFILE_BASE_URL.to_owned(),
            },
            upload: UploadConfig {
                status_settle_delay_secs: upload::DEFAULT_STATUS_SETTLE_DELAY_SECS,
                max_upload_bytes: upload::DEFAULT_MAX_UPLOAD_BYTES,
            },
            cache: CacheSettings {
                profile_ttl_secs: cache::PROFILE_TTL_SECS,
                video_ttl_secs: cache::VIDEO_TTL_SECS,
                max_entries: cache::MAX_ENTRIES,
            },
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if the app credentials are missing or a numeric value fails to parse
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let client_key = env::var("TIKTOK_CLIENT_KEY").context("TIKTOK_CLIENT_KEY must be set")?;
        let client_secret =
            env::var("TIKTOK_CLIENT_SECRET").context("TIKTOK_CLIENT_SECRET must be set")?;

        let config = Self {
            http_port: env_var_or("HTTP_PORT", &DEFAULT_HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            oauth: OAuthAppConfig {
                client_key,
                client_secret,
                redirect_uri: env_var_or("TIKTOK_REDIRECT_URI", oauth::DEFAULT_REDIRECT_URI),
                auth_url: env_var_or("TIKTOK_AUTH_URL", oauth::DEFAULT_AUTH_URL),
                scopes: parse_scopes(&env_var_or("TIKTOK_SCOPES", oauth::DEFAULT_SCOPES)),
                fixed_state: env::var("OAUTH_STATE").ok().filter(|s| !s.is_empty()),
                session_lifetime_secs: env_var_or(
                    "SESSION_LIFETIME_SECS",
                    &oauth::DEFAULT_SESSION_LIFETIME_SECS.to_string(),
                )
                .parse()
                .context("Invalid SESSION_LIFETIME_SECS value")?,
            },
            platform: PlatformConfig {
                api_base_url: env_var_or("TIKTOK_API_BASE_URL", api::DEFAULT_BASE_URL),
                profile_base_url: env_var_or(
                    "TIKTOK_PROFILE_BASE_URL",
                    api::DEFAULT_PROFILE_BASE_URL,
                ),
            },
            upload: UploadConfig {
                status_settle_delay_secs: env_var_or(
                    "PUBLISH_STATUS_DELAY_SECS",
                    &upload::DEFAULT_STATUS_SETTLE_DELAY_SECS.to_string(),
                )
                .parse()
                .context("Invalid PUBLISH_STATUS_DELAY_SECS value")?,
                max_upload_bytes: env_var_or(
                    "MAX_UPLOAD_BYTES",
                    &upload::DEFAULT_MAX_UPLOAD_BYTES.to_string(),
                )
                .parse()
                .context("Invalid MAX_UPLOAD_BYTES value")?,
            },
            cache: CacheSettings {
                profile_ttl_secs: env_var_or(
                    "PROFILE_CACHE_TTL_SECS",
                    &cache::PROFILE_TTL_SECS.to_string(),
                )
                .parse()
                .context("Invalid PROFILE_CACHE_TTL_SECS value")?,
                video_ttl_secs: env_var_or("VIDEO_CACHE_TTL_SECS", &cache::VIDEO_TTL_SECS.to_string())
                    .parse()
                    .context("Invalid VIDEO_CACHE_TTL_SECS value")?,
                max_entries: env_var_or("CACHE_MAX_ENTRIES", &cache::MAX_ENTRIES.to_string())
                    .parse()
                    .context("Invalid CACHE_MAX_ENTRIES value")?,
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are blank or a URL does not parse
    pub fn validate(&self) -> Result<()> {
        if self.oauth.client_key.trim().is_empty() || self.oauth.client_secret.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "TIKTOK_CLIENT_KEY and TIKTOK_CLIENT_SECRET cannot be empty"
            ));
        }

        url::Url::parse(&self.oauth.redirect_uri).context("Invalid TIKTOK_REDIRECT_URI")?;
        url::Url::parse(&self.oauth.auth_url).context("Invalid TIKTOK_AUTH_URL")?;
        url::Url::parse(&self.platform.api_base_url).context("Invalid TIKTOK_API_BASE_URL")?;

        if self.oauth.session_lifetime_secs == 0 {
            return Err(anyhow::anyhow!("SESSION_LIFETIME_SECS must be positive"));
        }
        if self.upload.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_BYTES must be positive"));
        }
        if self.cache.max_entries == 0 {
            return Err(anyhow::anyhow!("CACHE_MAX_ENTRIES must be positive"));
        }

        if self.oauth.fixed_state.is_some() {
            warn!("OAUTH_STATE is set; every login reuses the same state value");
        }

        Ok(())
    }

    /// Scopes as the comma-separated string the authorize endpoint expects
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.oauth.scopes.join(",")
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "TikTok Studio Configuration:\n\
             - HTTP Port: {}\n\
             - Environment: {}\n\
             - Log Level: {}\n\
             - Redirect URI: {}\n\
             - API Base URL: {}\n\
             - Scopes: {}\n\
             - OAuth State: {}\n\
             - Session Lifetime: {}s\n\
             - Publish Status Delay: {}s\n\
             - Max Upload: {} bytes\n\
             - Cache: profile {}s, video {}s, {} entries",
            self.http_port,
            self.environment,
            self.log_level,
            self.oauth.redirect_uri,
            self.platform.api_base_url,
            self.scope_string(),
            if self.oauth.fixed_state.is_some() {
                "Fixed"
            } else {
                "Per-request nonce"
            },
            self.oauth.session_lifetime_secs,
            self.upload.status_settle_delay_secs,
            self.upload.max_upload_bytes,
            self.cache.profile_ttl_secs,
            self.cache.video_ttl_secs,
            self.cache.max_entries,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse comma-separated scopes
fn parse_scopes(scopes_str: &str) -> Vec<String> {
    scopes_str
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}
