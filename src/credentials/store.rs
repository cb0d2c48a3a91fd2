// ABOUTME: Multi-account credential store with an active-account pointer and lazy expiry
// ABOUTME: DashMap records plus a single RwLock slot; expired records are evicted on read
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::oauth2_client::client::TokenGrant;
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Upper bound on a session (ten years), keeps timestamp arithmetic in range
const MAX_SESSION_SECS: i64 = 10 * 365 * 24 * 3600;

/// One authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Unique key
    pub open_id: String,
    /// Bearer token; never serialized into responses
    #[serde(skip_serializing, default)]
    pub access_token: String,
    /// Display name from the profile, if it could be fetched
    pub display_name: Option<String>,
    /// Avatar URL from the profile, if it could be fetched
    pub avatar_url: Option<String>,
    /// First time this account logged in
    pub added_at: DateTime<Utc>,
    /// After this instant the record is evicted on first use
    pub session_expires_at: DateTime<Utc>,
}

impl Credential {
    /// Build a credential from a token grant
    ///
    /// The session lasts `lifetime_secs`, or less if the token itself expires sooner.
    #[must_use]
    pub fn from_grant(
        grant: &TokenGrant,
        display_name: Option<String>,
        avatar_url: Option<String>,
        lifetime_secs: u64,
    ) -> Self {
        let now = Utc::now();
        let lifetime = grant
            .expires_in
            .map_or(lifetime_secs, |token_secs| token_secs.min(lifetime_secs));
        let lifetime = Duration::seconds(
            i64::try_from(lifetime)
                .unwrap_or(MAX_SESSION_SECS)
                .min(MAX_SESSION_SECS),
        );

        Self {
            open_id: grant.open_id.clone(),
            access_token: grant.access_token.clone(),
            display_name,
            avatar_url,
            added_at: now,
            session_expires_at: now + lifetime,
        }
    }

    /// Whether the session has passed its expiry at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.session_expires_at
    }

    /// Whether the session has expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Shared store of authenticated accounts
///
/// Lock order is always the active slot first, then the record map, and no
/// map guard is held across an `.await`.
#[derive(Default)]
pub struct CredentialStore {
    records: DashMap<String, Credential>,
    active: RwLock<Option<String>>,
}

impl CredentialStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the credential for its `open_id`
    ///
    /// Re-authenticating an existing account keeps its original `added_at`.
    /// Returns the stored record.
    pub fn upsert(&self, mut credential: Credential) -> Credential {
        match self.records.entry(credential.open_id.clone()) {
            Entry::Occupied(mut entry) => {
                credential.added_at = entry.get().added_at;
                entry.insert(credential.clone());
                debug!(open_id = %credential.open_id, "Credential refreshed");
            }
            Entry::Vacant(entry) => {
                entry.insert(credential.clone());
                info!(open_id = %credential.open_id, "Credential added");
            }
        }
        credential
    }

    /// Live credential for `open_id`; an expired one is evicted and `None` returned
    pub async fn get(&self, open_id: &str) -> Option<Credential> {
        let credential = self.records.get(open_id).map(|r| r.value().clone())?;
        if credential.is_expired() {
            self.evict(open_id).await;
            return None;
        }
        Some(credential)
    }

    /// All live credentials, oldest first
    pub async fn list(&self) -> Vec<Credential> {
        let now = Utc::now();
        let expired: Vec<String> = self
            .records
            .iter()
            .filter(|r| r.value().is_expired_at(now))
            .map(|r| r.key().clone())
            .collect();
        for open_id in &expired {
            self.evict(open_id).await;
        }

        let mut live: Vec<Credential> = self
            .records
            .iter()
            .filter(|r| !r.value().is_expired_at(now))
            .map(|r| r.value().clone())
            .collect();
        live.sort_by(|a, b| a.added_at.cmp(&b.added_at));
        live
    }

    /// Point the active slot at `open_id`; `false` (pointer unchanged) if no live record exists
    pub async fn set_active(&self, open_id: &str) -> bool {
        let mut active = self.active.write().await;
        let Some(expired) = self.records.get(open_id).map(|r| r.value().is_expired()) else {
            return false;
        };
        if expired {
            self.records.remove(open_id);
            if active.as_deref() == Some(open_id) {
                *active = None;
            }
            debug!(open_id = %open_id, "Evicted expired credential");
            return false;
        }
        *active = Some(open_id.to_owned());
        true
    }

    /// Remove a credential, clearing the active slot if it pointed there
    pub async fn remove(&self, open_id: &str) -> bool {
        let mut active = self.active.write().await;
        let removed = self.records.remove(open_id).is_some();
        if active.as_deref() == Some(open_id) {
            *active = None;
        }
        if removed {
            info!(open_id = %open_id, "Credential removed");
        }
        removed
    }

    /// The active credential, or `None` if unset or expired (an expired one is evicted)
    pub async fn get_active(&self) -> Option<Credential> {
        let open_id = self.active.read().await.clone()?;
        let credential = self.records.get(&open_id).map(|r| r.value().clone());
        match credential {
            Some(credential) if !credential.is_expired() => Some(credential),
            _ => {
                self.evict(&open_id).await;
                None
            }
        }
    }

    /// The active `open_id` without an expiry check
    pub async fn active_open_id(&self) -> Option<String> {
        self.active.read().await.clone()
    }

    /// Clear the active slot; records are untouched
    pub async fn clear_active(&self) {
        *self.active.write().await = None;
    }

    /// Number of stored records, expired ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    async fn evict(&self, open_id: &str) {
        let mut active = self.active.write().await;
        let removed = self
            .records
            .remove_if(open_id, |_, credential| credential.is_expired())
            .is_some();
        let gone = removed || !self.records.contains_key(open_id);
        if gone && active.as_deref() == Some(open_id) {
            *active = None;
        }
        if removed {
            debug!(open_id = %open_id, "Evicted expired credential");
        }
    }
}
