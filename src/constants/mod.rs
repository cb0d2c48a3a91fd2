// ABOUTME: Constants module with domain-separated organization
// ABOUTME: OAuth, platform endpoints, upload geometry, timeouts and service names
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Constants module
//!
//! Constants are grouped by domain rather than kept in a single flat list.

/// OAuth 2.0 + PKCE constants
pub mod oauth {
    /// Length of the generated PKCE code verifier
    pub const CODE_VERIFIER_LENGTH: usize = 64;

    /// RFC 7636 unreserved characters allowed in a code verifier
    pub const VERIFIER_ALPHABET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

    /// Challenge method advertised on the authorize URL
    pub const CODE_CHALLENGE_METHOD: &str = "S256";

    /// Default authorize endpoint
    pub const DEFAULT_AUTH_URL: &str = "https://www.tiktok.com/v2/auth/authorize/";

    /// Default redirect URI, must match the one registered in the developer portal
    pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3456/callback/";

    /// Scopes needed for profile reads, video listing and publishing
    pub const DEFAULT_SCOPES: &str =
        "user.info.basic,user.info.profile,user.info.stats,video.list,video.publish,video.upload";

    /// Lifetime of a pending authorization session and of a login session
    pub const DEFAULT_SESSION_LIFETIME_SECS: u64 = 300;
}

/// Platform REST API endpoints (relative to the API base URL)
pub mod api {
    /// Default API host
    pub const DEFAULT_BASE_URL: &str = "https://open.tiktokapis.com";

    /// Public web host used to build profile links
    pub const DEFAULT_PROFILE_BASE_URL: &str = "https://www.tiktok.com";

    /// Token endpoint
    pub const TOKEN_PATH: &str = "/v2/oauth/token/";
    /// User info endpoint
    pub const USER_INFO_PATH: &str = "/v2/user/info/";
    /// Video list endpoint
    pub const VIDEO_LIST_PATH: &str = "/v2/video/list/";
    /// Video query endpoint
    pub const VIDEO_QUERY_PATH: &str = "/v2/video/query/";
    /// Creator capability endpoint
    pub const CREATOR_INFO_PATH: &str = "/v2/post/publish/creator_info/query/";
    /// Direct post init endpoint
    pub const DIRECT_POST_INIT_PATH: &str = "/v2/post/publish/video/init/";
    /// Draft (inbox) init endpoint
    pub const INBOX_INIT_PATH: &str = "/v2/post/publish/inbox/video/init/";
    /// Publish status endpoint
    pub const PUBLISH_STATUS_PATH: &str = "/v2/post/publish/status/fetch/";

    /// Profile fields requested after login and on the dashboard
    pub const PROFILE_FIELDS: &str = "open_id,display_name,avatar_url,bio_description,profile_web_link,profile_deep_link,is_verified,follower_count,following_count,video_count,likes_count";
    /// Stats fields (`user.info.stats` scope)
    pub const STATS_FIELDS: &str = "follower_count,following_count,video_count,likes_count";
    /// Fields requested from the video list endpoint
    pub const VIDEO_LIST_FIELDS: &str = "id,title,cover_image_url,create_time";
    /// Fields requested when merging list entries with details
    pub const VIDEO_BATCH_FIELDS: &str = "id,title,duration,view_count,like_count,comment_count,share_count,embed_link,cover_image_url,create_time";
    /// Fields requested for a single video page
    pub const VIDEO_DETAIL_FIELDS: &str = "id,title,duration,view_count,like_count,comment_count,share_count,embed_link,cover_image_url,height,width,create_time";

    /// Default page size for the video list call
    pub const DEFAULT_VIDEO_LIST_COUNT: u32 = 20;
}

/// Upload geometry and publish policy
pub mod upload {
    /// Recommended chunk size (10 MiB)
    pub const RECOMMENDED_CHUNK_SIZE: u64 = 10 * 1024 * 1024;

    /// Cover frame offset sent with every post
    pub const VIDEO_COVER_TIMESTAMP_MS: u64 = 1000;

    /// Content type of every chunk PUT
    pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

    /// Source declared at init
    pub const SOURCE_FILE_UPLOAD: &str = "FILE_UPLOAD";

    /// Longest title the platform accepts
    pub const MAX_TITLE_LENGTH: usize = 2200;

    /// Largest accepted upload (100 MiB)
    pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

    /// Wait before the single publish-status query
    pub const DEFAULT_STATUS_SETTLE_DELAY_SECS: u64 = 3;

    /// Privacy option that marks a public account
    pub const PUBLIC_TO_EVERYONE: &str = "PUBLIC_TO_EVERYONE";

    /// Privacy option that a private account still offers
    pub const FOLLOWER_OF_CREATOR: &str = "FOLLOWER_OF_CREATOR";

    /// Platform error code returned when an unaudited app posts to a public account
    pub const UNAUDITED_PRIVATE_ONLY: &str = "unaudited_client_can_only_post_to_private_accounts";
}

/// Network timeouts in seconds
pub mod timeouts {
    /// Token exchange request timeout
    pub const OAUTH_REQUEST_SECS: u64 = 15;
    /// Token exchange connect timeout
    pub const OAUTH_CONNECT_SECS: u64 = 5;
    /// Read/publish API request timeout
    pub const API_REQUEST_SECS: u64 = 30;
    /// Read/publish API connect timeout
    pub const API_CONNECT_SECS: u64 = 10;
    /// Single chunk PUT timeout
    pub const CHUNK_REQUEST_SECS: u64 = 60;
}

/// Cache defaults
pub mod cache {
    /// Profile entries live for 5 minutes
    pub const PROFILE_TTL_SECS: u64 = 300;
    /// Video entries live for 10 minutes
    pub const VIDEO_TTL_SECS: u64 = 600;
    /// Default LRU capacity
    pub const MAX_ENTRIES: usize = 1000;
    /// Background sweep interval
    pub const CLEANUP_INTERVAL_SECS: u64 = 60;
}

/// Service identification
pub mod service_names {
    /// Name used in structured logs
    pub const TIKTOK_STUDIO: &str = "tiktok-studio";
}
