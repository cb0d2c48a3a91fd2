// ABOUTME: Creator capability check run before every upload
// ABOUTME: Fetches creator info, normalizes both envelope shapes and evaluates the private-account rule
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::constants::{api, upload};
use crate::errors::{AppError, AppResult};
use crate::providers::envelope;
use crate::providers::tiktok::{ApiResponse, TikTokApiClient};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Creator capabilities from `/v2/post/publish/creator_info/query/`
///
/// Every field tolerates an explicit `null`; only a missing `data` object is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatorInfo {
    /// `@handle`, used for the profile link
    #[serde(deserialize_with = "envelope::null_as_default")]
    pub creator_username: String,
    /// Display name
    #[serde(deserialize_with = "envelope::null_as_default")]
    pub creator_nickname: String,
    /// Avatar URL
    #[serde(deserialize_with = "envelope::null_as_default")]
    pub creator_avatar_url: String,
    /// Privacy levels the account may post with
    #[serde(deserialize_with = "envelope::null_as_default")]
    pub privacy_level_options: Vec<String>,
    /// Comments disabled in the account settings
    #[serde(deserialize_with = "envelope::null_as_default")]
    pub comment_disabled: bool,
    /// Duets disabled in the account settings
    #[serde(deserialize_with = "envelope::null_as_default")]
    pub duet_disabled: bool,
    /// Stitches disabled in the account settings
    #[serde(deserialize_with = "envelope::null_as_default")]
    pub stitch_disabled: bool,
    /// Longest allowed video
    pub max_video_post_duration_sec: Option<u64>,
}

/// Outcome of the private-account rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivacyVerdict {
    /// The account is private
    Private,
    /// The account allows public posts; unaudited apps will be refused at init
    PrivateGateFailed,
    /// No privacy options were returned
    Unknown,
}

/// Private means `PUBLIC_TO_EVERYONE` is absent and `FOLLOWER_OF_CREATOR` is present
#[must_use]
pub fn is_private_account<S: AsRef<str>>(privacy_level_options: &[S]) -> bool {
    let has = |level: &str| privacy_level_options.iter().any(|o| o.as_ref() == level);
    !has(upload::PUBLIC_TO_EVERYONE) && has(upload::FOLLOWER_OF_CREATOR)
}

impl CreatorInfo {
    /// Normalize a 200 creator-info payload (`data.creator_info` or `data`)
    ///
    /// # Errors
    ///
    /// Returns `CapabilityFetchFailed` if the payload has no `data` object
    pub fn from_payload(payload: &Value) -> AppResult<Self> {
        let info = envelope::nested_or_data(payload, "creator_info").ok_or_else(|| {
            AppError::capability_fetch("Creator info response has no data field")
        })?;
        Self::deserialize(info)
            .map_err(|e| AppError::capability_fetch(format!("Creator info is malformed: {e}")))
    }

    /// Evaluate the private-account rule
    #[must_use]
    pub fn verdict(&self) -> PrivacyVerdict {
        if self.privacy_level_options.is_empty() {
            PrivacyVerdict::Unknown
        } else if is_private_account(&self.privacy_level_options) {
            PrivacyVerdict::Private
        } else {
            PrivacyVerdict::PrivateGateFailed
        }
    }
}

/// Capability gate over the platform API
pub struct CapabilityGate {
    api: TikTokApiClient,
}

impl CapabilityGate {
    /// Create a gate using `api`
    #[must_use]
    pub const fn new(api: TikTokApiClient) -> Self {
        Self { api }
    }

    /// Fetch fresh creator info
    ///
    /// # Errors
    ///
    /// - `InsufficientScope` on 401
    /// - `RateLimited` on 429
    /// - `CapabilityFetchFailed` on any other non-200 or a payload without `data`
    /// - `NetworkTimeout` / `NetworkError` on transport failure
    pub async fn fetch(&self, access_token: &str) -> AppResult<CreatorInfo> {
        let request = self
            .api
            .request(Method::POST, api::CREATOR_INFO_PATH, access_token)
            .header("Content-Type", "application/json; charset=UTF-8")
            .header("Cache-Control", "no-cache, no-store, must-revalidate")
            .header("Pragma", "no-cache")
            .header("Expires", "0")
            .json(&json!({}));

        let response = TikTokApiClient::execute(request, "Creator info request").await?;
        let info = CreatorInfo::from_payload(&Self::check_status(response)?.body)?;

        info!(
            creator = %info.creator_username,
            verdict = ?info.verdict(),
            "Creator info fetched"
        );
        Ok(info)
    }

    fn check_status(response: ApiResponse) -> AppResult<ApiResponse> {
        match response.status {
            StatusCode::OK => Ok(response),
            StatusCode::UNAUTHORIZED => {
                warn!("Creator info refused: Content Posting API scope missing");
                Err(AppError::insufficient_scope(
                    "Content Posting API permission is missing. Enable the Content Posting API in the app settings.",
                ))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Creator info rate limited (20 requests per minute)");
                Err(AppError::rate_limited(
                    "API rate limit reached. Please wait a moment and try again.",
                ))
            }
            status => {
                warn!(status = status.as_u16(), body = %response.raw, "Creator info request failed");
                Err(AppError::capability_fetch(format!(
                    "Creator info request failed with HTTP {}: {}",
                    status.as_u16(),
                    response.raw
                )))
            }
        }
    }
}
