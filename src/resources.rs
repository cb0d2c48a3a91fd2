// ABOUTME: Shared resource container injected into every route handler
// ABOUTME: Builds the API client, cache, credential store, login flow and upload pipeline once
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Server Resources Module
//!
//! Centralized resource container for dependency injection. Everything is
//! created once at start-up and shared through `Arc`s.

use crate::cache::{CacheConfig, InMemoryCache};
use crate::config::ServerConfig;
use crate::credentials::CredentialStore;
use crate::oauth2_client::LoginFlowManager;
use crate::providers::tiktok::TikTokApiClient;
use crate::services::AccountDataService;
use crate::upload::UploadOrchestrator;
use std::sync::Arc;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Logged-in accounts
    pub credentials: Arc<CredentialStore>,
    /// Login, switch and logout
    pub login_flow: Arc<LoginFlowManager>,
    /// Cached profile and video reads
    pub account_data: Arc<AccountDataService>,
    /// Upload pipeline
    pub uploads: Arc<UploadOrchestrator>,
    /// Read-through cache shared with `account_data`
    pub cache: InMemoryCache,
}

impl ServerResources {
    /// Wire up all shared resources from `config`
    ///
    /// Must be called inside a tokio runtime: the cache starts its cleanup task here.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let api = TikTokApiClient::new(config.platform.api_base_url.clone());
        let cache = InMemoryCache::new(&CacheConfig::from(&config.cache));
        let credentials = Arc::new(CredentialStore::new());

        let login_flow = Arc::new(LoginFlowManager::new(
            &config,
            Arc::clone(&credentials),
            api.clone(),
        ));
        let account_data = Arc::new(AccountDataService::new(api.clone(), cache.clone()));
        let uploads = Arc::new(UploadOrchestrator::new(api, &config));

        Self {
            config: Arc::new(config),
            credentials,
            login_flow,
            account_data,
            uploads,
            cache,
        }
    }
}
