// ABOUTME: Cache layer for platform read responses with per-account keys
// ABOUTME: Structured keys, per-resource TTLs and the in-memory LRU backend
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// In-memory cache implementation
pub mod memory;

use crate::config::CacheSettings;
use crate::constants::cache::{CLEANUP_INTERVAL_SECS, MAX_ENTRIES, PROFILE_TTL_SECS, VIDEO_TTL_SECS};
use std::fmt;
use std::time::Duration;

pub use memory::InMemoryCache;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Cleanup interval for expired entries
    pub cleanup_interval: Duration,
    /// Run the background sweep (tests usually disable it)
    pub enable_background_cleanup: bool,
    /// TTLs per resource type
    pub ttl: CacheTtlConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: MAX_ENTRIES,
            cleanup_interval: Duration::from_secs(CLEANUP_INTERVAL_SECS),
            enable_background_cleanup: true,
            ttl: CacheTtlConfig::default(),
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            max_entries: settings.max_entries,
            ttl: CacheTtlConfig {
                profile_secs: settings.profile_ttl_secs,
                video_secs: settings.video_ttl_secs,
            },
            ..Self::default()
        }
    }
}

/// Cache TTL configuration for different resource types
#[derive(Debug, Clone, Copy)]
pub struct CacheTtlConfig {
    /// Profile TTL in seconds (default: 5 minutes)
    pub profile_secs: u64,
    /// Video list and video detail TTL in seconds (default: 10 minutes)
    pub video_secs: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            profile_secs: PROFILE_TTL_SECS,
            video_secs: VIDEO_TTL_SECS,
        }
    }
}

impl CacheTtlConfig {
    /// Get TTL duration for a specific cache resource type
    #[must_use]
    pub const fn ttl_for_resource(&self, resource: &CacheResource) -> Duration {
        match resource {
            CacheResource::Profile => Duration::from_secs(self.profile_secs),
            CacheResource::VideoList { .. } | CacheResource::Video { .. } => {
                Duration::from_secs(self.video_secs)
            }
        }
    }
}

/// Structured cache key scoped to one account
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Account the data belongs to
    pub open_id: String,
    /// Specific resource being cached
    pub resource: CacheResource,
}

impl CacheKey {
    /// Create new cache key
    #[must_use]
    pub fn new(open_id: impl Into<String>, resource: CacheResource) -> Self {
        Self {
            open_id: open_id.into(),
            resource,
        }
    }

    /// Prefix shared by every entry of one account
    #[must_use]
    pub fn user_prefix(open_id: &str) -> String {
        format!("user:{open_id}:")
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::user_prefix(&self.open_id), self.resource)
    }
}

/// Cache resource types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheResource {
    /// Profile merged with stats
    Profile,
    /// Merged video list
    VideoList {
        /// Requested list size
        max_count: u32,
    },
    /// Single video details
    Video {
        /// Platform video id
        video_id: String,
    },
}

impl fmt::Display for CacheResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile => write!(f, "profile"),
            Self::VideoList { max_count } => write!(f, "video_list:max_count:{max_count}"),
            Self::Video { video_id } => write!(f, "video:{video_id}"),
        }
    }
}
