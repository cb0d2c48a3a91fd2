// ABOUTME: TikTok Open API client for profile, stats and video reads plus raw publish calls
// ABOUTME: Bearer-authenticated requests with transport errors converted at the boundary
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::envelope;
use crate::constants::api;
use crate::errors::{AppError, AppResult};
use crate::utils::http_client::api_client;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Profile fields from `/v2/user/info/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Account id
    pub open_id: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Bio text
    pub bio_description: Option<String>,
    /// Web profile link
    pub profile_web_link: Option<String>,
    /// App deep link
    pub profile_deep_link: Option<String>,
    /// Verified badge
    pub is_verified: bool,
    /// Follower count
    pub follower_count: u64,
    /// Following count
    pub following_count: u64,
    /// Public video count
    pub video_count: u64,
    /// Total likes received
    pub likes_count: u64,
}

impl UserProfile {
    /// Overlay stats fetched separately
    pub fn merge_stats(&mut self, stats: &UserStats) {
        self.follower_count = stats.follower_count;
        self.following_count = stats.following_count;
        self.video_count = stats.video_count;
        self.likes_count = stats.likes_count;
    }
}

/// Counters from the `user.info.stats` scope; zero when unavailable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStats {
    /// Follower count
    pub follower_count: u64,
    /// Following count
    pub following_count: u64,
    /// Public video count
    pub video_count: u64,
    /// Total likes received
    pub likes_count: u64,
}

/// A video as returned by the list or query endpoints, plus display fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    /// Platform video id
    pub id: String,
    /// Caption
    pub title: Option<String>,
    /// Cover image URL
    pub cover_image_url: Option<String>,
    /// Unix seconds
    pub create_time: Option<i64>,
    /// Seconds
    pub duration: Option<u64>,
    /// Views
    pub view_count: Option<u64>,
    /// Likes
    pub like_count: Option<u64>,
    /// Comments
    pub comment_count: Option<u64>,
    /// Shares
    pub share_count: Option<u64>,
    /// Embeddable link
    pub embed_link: Option<String>,
    /// Pixel height
    pub height: Option<u64>,
    /// Pixel width
    pub width: Option<u64>,
    /// Best image to show for this video
    pub best_image_url: Option<String>,
    /// Human-readable creation time
    pub formatted_create_time: Option<String>,
}

impl Video {
    /// Overlay the fields a detailed record of the same video carries
    pub fn merge_details(&mut self, details: Self) {
        fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }
        fill(&mut self.title, details.title);
        fill(&mut self.cover_image_url, details.cover_image_url);
        fill(&mut self.create_time, details.create_time);
        fill(&mut self.duration, details.duration);
        fill(&mut self.view_count, details.view_count);
        fill(&mut self.like_count, details.like_count);
        fill(&mut self.comment_count, details.comment_count);
        fill(&mut self.share_count, details.share_count);
        fill(&mut self.embed_link, details.embed_link);
        fill(&mut self.height, details.height);
        fill(&mut self.width, details.width);
    }
}

/// One page of `/v2/video/list/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoList {
    /// Videos on this page
    pub videos: Vec<Video>,
    /// Cursor for the next page
    pub cursor: Option<i64>,
    /// More pages available
    pub has_more: bool,
}

/// Status and parsed body of a platform call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Parsed JSON body (a string value when the body was not JSON)
    pub body: Value,
    /// Raw body text, for error messages
    pub raw: String,
}

impl ApiResponse {
    /// True for HTTP 200
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }
}

/// Client for the platform REST API
#[derive(Clone)]
pub struct TikTokApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl TikTokApiClient {
    /// Create a client against `base_url` (normally `https://open.tiktokapis.com`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client: api_client(),
        }
    }

    /// Absolute URL for an API path
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Bearer-authenticated request builder for an API path
    #[must_use]
    pub fn request(&self, method: Method, path: &str, access_token: &str) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(path))
            .bearer_auth(access_token)
    }

    /// Send a request and read its body; only transport failures are errors here
    ///
    /// # Errors
    ///
    /// Returns `NetworkTimeout` or `NetworkError` on transport failure
    pub async fn execute(request: RequestBuilder, context: &str) -> AppResult<ApiResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::from_transport(context, e))?;
        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| AppError::from_transport(context, e))?;
        debug!(status = status.as_u16(), context, "Platform API response");

        Ok(ApiResponse {
            status,
            body: envelope::parse_body(&raw),
            raw,
        })
    }

    /// Fetch the profile (`data.user`)
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-200 answer or a missing `data.user`
    pub async fn user_info(&self, access_token: &str) -> AppResult<UserProfile> {
        let request = self
            .request(Method::GET, api::USER_INFO_PATH, access_token)
            .query(&[("fields", api::PROFILE_FIELDS)]);
        let response = Self::expect_ok(Self::execute(request, "User info request").await?)?;

        envelope::decode_data_field(&response.body, "user")
            .ok_or_else(|| AppError::malformed("User info response has no data.user"))
    }

    /// Fetch stats counters, falling back to zeros on any failure
    pub async fn user_stats(&self, access_token: &str) -> UserStats {
        let request = self
            .request(Method::GET, api::USER_INFO_PATH, access_token)
            .query(&[("fields", api::STATS_FIELDS)]);

        match Self::execute(request, "User stats request")
            .await
            .and_then(Self::expect_ok)
        {
            Ok(response) => {
                envelope::decode_data_field(&response.body, "user").unwrap_or_default()
            }
            Err(e) => {
                warn!(error = %e, "User stats unavailable, using zero counters");
                UserStats::default()
            }
        }
    }

    /// List the account's videos (`data.videos`, `cursor`, `has_more`)
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-200 answer or a malformed video list
    pub async fn list_videos(&self, access_token: &str, max_count: u32) -> AppResult<VideoList> {
        let request = self
            .request(Method::POST, api::VIDEO_LIST_PATH, access_token)
            .query(&[("fields", api::VIDEO_LIST_FIELDS)])
            .json(&json!({ "max_count": max_count }));
        let response = Self::expect_ok(Self::execute(request, "Video list request").await?)?;

        let data = envelope::data(&response.body);
        Ok(VideoList {
            videos: Self::decode_videos(&response.body)?,
            cursor: data.and_then(|d| d.get("cursor")).and_then(Value::as_i64),
            has_more: data
                .and_then(|d| d.get("has_more"))
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }

    /// Query videos by id (`data.videos`)
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-200 answer or a malformed video list
    pub async fn query_videos(
        &self,
        access_token: &str,
        video_ids: &[String],
        fields: &str,
    ) -> AppResult<Vec<Video>> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .request(Method::POST, api::VIDEO_QUERY_PATH, access_token)
            .query(&[("fields", fields)])
            .json(&json!({ "filters": { "video_ids": video_ids } }));
        let response = Self::expect_ok(Self::execute(request, "Video query request").await?)?;

        Self::decode_videos(&response.body)
    }

    /// `data.videos`; absent or null is empty, anything else must decode
    fn decode_videos(body: &Value) -> AppResult<Vec<Video>> {
        match envelope::data(body).and_then(|d| d.get("videos")) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(videos) => Vec::<Video>::deserialize(videos)
                .map_err(|e| AppError::malformed(format!("Video list is malformed: {e}"))),
        }
    }

    /// Map a non-200 read response to an error
    fn expect_ok(response: ApiResponse) -> AppResult<ApiResponse> {
        if response.is_ok() {
            return Ok(response);
        }
        let status = response.status.as_u16();
        warn!(status, body = %response.raw, "Platform API request failed");
        if response.status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::rate_limited("Platform API rate limit reached"));
        }
        let detail = envelope::platform_error(&response.body)
            .map_or_else(|| response.raw.clone(), |e| format!("{}: {}", e.code, e.message));
        Err(AppError::new(
            crate::errors::ErrorCode::NetworkError,
            format!("Platform API answered {status}: {detail}"),
        ))
    }
}
