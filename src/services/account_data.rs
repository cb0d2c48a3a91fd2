// ABOUTME: Read-side account service combining profile, stats and video calls with a TTL cache
// ABOUTME: Merges video list entries with batch details and adds display fields
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::cache::{CacheKey, CacheResource, InMemoryCache};
use crate::constants::api;
use crate::credentials::Credential;
use crate::errors::AppResult;
use crate::providers::tiktok::{TikTokApiClient, UserProfile, Video};
use chrono::DateTime;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Shown when a video has no usable creation time
pub const UNKNOWN_TIME: &str = "Unknown";

/// Format a Unix timestamp (seconds) as `YYYY-MM-DD HH:MM` UTC
#[must_use]
pub fn format_create_time(create_time: Option<i64>) -> String {
    create_time
        .filter(|ts| *ts > 0)
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map_or_else(
            || UNKNOWN_TIME.to_owned(),
            |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
        )
}

/// Read-through access to profile and video data
pub struct AccountDataService {
    api: TikTokApiClient,
    cache: InMemoryCache,
}

impl AccountDataService {
    /// Create the service
    #[must_use]
    pub const fn new(api: TikTokApiClient, cache: InMemoryCache) -> Self {
        Self { api, cache }
    }

    /// Profile merged with stats counters
    ///
    /// # Errors
    ///
    /// Returns an error if the profile call fails; stats failures fall back to zeros
    pub async fn profile(&self, credential: &Credential) -> AppResult<UserProfile> {
        let key = CacheKey::new(&credential.open_id, CacheResource::Profile);
        if let Some(profile) = self.cached(&key).await {
            return Ok(profile);
        }

        let mut profile = self.api.user_info(&credential.access_token).await?;
        let stats = self.api.user_stats(&credential.access_token).await;
        profile.merge_stats(&stats);

        self.store(&key, &profile).await;
        Ok(profile)
    }

    /// Video list merged with batch details
    ///
    /// # Errors
    ///
    /// Returns an error if the list call fails; a failed detail query keeps the list entries
    pub async fn videos(&self, credential: &Credential, max_count: u32) -> AppResult<Vec<Video>> {
        let key = CacheKey::new(&credential.open_id, CacheResource::VideoList { max_count });
        if let Some(videos) = self.cached(&key).await {
            return Ok(videos);
        }

        let mut videos = self
            .api
            .list_videos(&credential.access_token, max_count)
            .await?
            .videos;

        let ids: Vec<String> = videos
            .iter()
            .filter(|v| !v.id.is_empty())
            .map(|v| v.id.clone())
            .collect();
        let mut details: HashMap<String, Video> = match self
            .api
            .query_videos(&credential.access_token, &ids, api::VIDEO_BATCH_FIELDS)
            .await
        {
            Ok(found) => found.into_iter().map(|v| (v.id.clone(), v)).collect(),
            Err(e) => {
                warn!(error = %e, "Video details unavailable, showing list data only");
                HashMap::new()
            }
        };

        for video in &mut videos {
            if let Some(detail) = details.remove(&video.id) {
                video.merge_details(detail);
            }
            Self::decorate(video);
        }

        self.store(&key, &videos).await;
        Ok(videos)
    }

    /// Details of one video, `None` if the platform does not return it
    ///
    /// # Errors
    ///
    /// Returns an error if the query call fails
    pub async fn video_details(
        &self,
        credential: &Credential,
        video_id: &str,
    ) -> AppResult<Option<Video>> {
        let key = CacheKey::new(
            &credential.open_id,
            CacheResource::Video {
                video_id: video_id.to_owned(),
            },
        );
        if let Some(video) = self.cached(&key).await {
            return Ok(Some(video));
        }

        let ids = [video_id.to_owned()];
        let Some(mut video) = self
            .api
            .query_videos(&credential.access_token, &ids, api::VIDEO_DETAIL_FIELDS)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        Self::decorate(&mut video);
        self.store(&key, &video).await;
        Ok(Some(video))
    }

    /// Drop cached data of one account
    pub async fn forget(&self, open_id: &str) {
        let removed = self.cache.invalidate_user(open_id).await;
        debug!(open_id, removed, "Cleared cached account data");
    }

    fn decorate(video: &mut Video) {
        video.best_image_url = video.cover_image_url.clone().filter(|url| !url.is_empty());
        video.formatted_create_time = Some(format_create_time(video.create_time));
    }

    async fn cached<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        match self.cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, cache.key = %key, "Ignoring unreadable cache entry");
                self.cache.invalidate(key).await;
                None
            }
        }
    }

    async fn store<T: serde::Serialize + Sync>(&self, key: &CacheKey, value: &T) {
        if let Err(e) = self.cache.set(key, value).await {
            warn!(error = %e, cache.key = %key, "Could not cache account data");
        }
    }
}
