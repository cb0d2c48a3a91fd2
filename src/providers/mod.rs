// ABOUTME: Platform provider integration for the TikTok Open API
// ABOUTME: Response envelope normalization and the bearer-authenticated API client
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Dual-shape response normalization
pub mod envelope;
/// API client and read-side models
pub mod tiktok;

pub use tiktok::{ApiResponse, TikTokApiClient, UserProfile, UserStats, Video, VideoList};
