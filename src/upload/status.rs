// ABOUTME: Publish status query run once after a transfer completes
// ABOUTME: Also derives the advisory video id embedded in a publish id
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::constants::api;
use crate::errors::{AppError, AppResult};
use crate::providers::envelope;
use crate::providers::tiktok::TikTokApiClient;
use regex::Regex;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::OnceLock;
use tracing::debug;

/// Publish status from `/v2/post/publish/status/fetch/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishStatus {
    /// `PROCESSING_UPLOAD`, `SEND_TO_USER_INBOX`, `PUBLISH_COMPLETE`, `FAILED`, ...
    pub status: String,
    /// Failure reason when `status == FAILED`
    pub fail_reason: Option<String>,
    /// Bytes the platform has received
    pub uploaded_bytes: Option<u64>,
    /// Public post ids once published (field name as sent by the platform)
    #[serde(rename = "publicaly_available_post_id")]
    pub publicly_available_post_id: Vec<u64>,
}

/// Queries publish status for a `publish_id`
pub struct StatusPoller {
    api: TikTokApiClient,
}

impl StatusPoller {
    /// Create a poller using `api`
    #[must_use]
    pub const fn new(api: TikTokApiClient) -> Self {
        Self { api }
    }

    /// Query status once
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-200 answer or a missing `data` object
    pub async fn fetch(&self, access_token: &str, publish_id: &str) -> AppResult<PublishStatus> {
        let request = self
            .api
            .request(Method::POST, api::PUBLISH_STATUS_PATH, access_token)
            .json(&json!({ "publish_id": publish_id }));
        let response = TikTokApiClient::execute(request, "Publish status request").await?;

        if response.status != StatusCode::OK {
            return Err(AppError::new(
                crate::errors::ErrorCode::NetworkError,
                format!(
                    "Publish status request failed with HTTP {}: {}",
                    response.status.as_u16(),
                    response.raw
                ),
            ));
        }

        let data = envelope::data(&response.body)
            .ok_or_else(|| AppError::malformed("Publish status response has no data field"))?;
        let status = PublishStatus::deserialize(data)
            .map_err(|e| AppError::malformed(format!("Publish status is malformed: {e}")))?;
        debug!(publish_id, status = %status.status, "Publish status fetched");
        Ok(status)
    }
}

fn digits() -> Option<&'static Regex> {
    static DIGITS: OnceLock<Option<Regex>> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d+").ok()).as_ref()
}

/// Derive the video id from a publish id: the last digit run after the last `~`
///
/// `v_pub_file~v2-1.7534632449491552261` yields `7534632449491552261`. The
/// format is undocumented, so the result is advisory only. Without a `~` or
/// without digits, the relevant part is returned unchanged.
#[must_use]
pub fn video_id_from_publish_id(publish_id: &str) -> String {
    let Some((_, tail)) = publish_id.rsplit_once('~') else {
        return publish_id.to_owned();
    };
    digits()
        .and_then(|re| re.find_iter(tail).last())
        .map_or_else(|| tail.to_owned(), |m| m.as_str().to_owned())
}
