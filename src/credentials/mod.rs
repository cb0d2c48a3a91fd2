// ABOUTME: Credential management for authenticated platform accounts
// ABOUTME: Exposes the multi-account store and the credential record
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// In-memory multi-account store
pub mod store;

pub use store::{Credential, CredentialStore};
