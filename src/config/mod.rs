// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Re-exports the environment-driven server configuration
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Configuration module

/// Environment and server configuration
pub mod environment;

pub use environment::{
    CacheSettings, Environment, LogLevel, OAuthAppConfig, PlatformConfig, ServerConfig,
    UploadConfig,
};
