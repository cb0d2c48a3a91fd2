// ABOUTME: Domain service layer shared by the HTTP routes
// ABOUTME: Read-side account data with caching
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Domain service layer
//!
//! Route handlers stay thin and delegate to these services.

/// Profile and video data for logged-in accounts
pub mod account_data;

pub use account_data::{format_create_time, AccountDataService};
