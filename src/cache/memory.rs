// ABOUTME: In-memory cache implementation with LRU eviction and TTL support
// ABOUTME: Includes background cleanup task for expired entries
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{CacheConfig, CacheKey, CacheTtlConfig};
use crate::errors::{AppError, AppResult};
use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

type Store = Arc<RwLock<LruCache<String, CacheEntry>>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn remaining_ttl(&self) -> Option<Duration> {
        self.expires_at.checked_duration_since(Instant::now())
    }
}

/// In-memory cache with LRU eviction and background cleanup
///
/// The store sits behind an `Arc` so the cleanup task spawned at construction
/// can sweep expired entries concurrently with lookups.
#[derive(Clone)]
pub struct InMemoryCache {
    store: Store,
    ttl: CacheTtlConfig,
    shutdown_tx: Option<Arc<tokio::sync::mpsc::Sender<()>>>,
}

impl InMemoryCache {
    const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create the cache; with background cleanup enabled this must run inside a tokio runtime
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.max_entries).unwrap_or(Self::DEFAULT_CACHE_CAPACITY);
        let store: Store = Arc::new(RwLock::new(LruCache::new(capacity)));

        let shutdown_tx = if config.enable_background_cleanup {
            let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
            let store_clone = store.clone();
            let cleanup_interval = config.cleanup_interval;

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(cleanup_interval);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            Self::sweep(&store_clone).await;
                        }
                        _ = shutdown_rx.recv() => {
                            tracing::debug!("Cache cleanup task received shutdown signal");
                            break;
                        }
                    }
                }
            });

            Some(Arc::new(shutdown_tx))
        } else {
            None
        };

        Self {
            store,
            ttl: config.ttl,
            shutdown_tx,
        }
    }

    /// TTL that applies to `key`'s resource type
    #[must_use]
    pub const fn ttl_for(&self, key: &CacheKey) -> Duration {
        self.ttl.ttl_for_resource(&key.resource)
    }

    /// Store a value under its resource TTL
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub async fn set<T: Serialize + Sync>(&self, key: &CacheKey, value: &T) -> AppResult<()> {
        self.set_with_ttl(key, value, self.ttl_for(key)).await
    }

    /// Store a value with an explicit TTL
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub async fn set_with_ttl<T: Serialize + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let serialized = serde_json::to_vec(value)
            .map_err(|e| AppError::internal(format!("Cache serialization failed: {e}")))?;
        self.store
            .write()
            .await
            .push(key.to_string(), CacheEntry::new(serialized, ttl));
        Ok(())
    }

    /// Retrieve a live value; expired entries are dropped
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let key = key.to_string();
        let mut store = self.store.write().await;

        let Some(entry) = store.get(&key) else {
            tracing::debug!(cache.key = %key, "Cache miss");
            return Ok(None);
        };
        if entry.is_expired() {
            store.pop(&key);
            tracing::debug!(cache.key = %key, "Cache entry expired");
            return Ok(None);
        }

        let value = serde_json::from_slice(&entry.data)
            .map_err(|e| AppError::internal(format!("Cache deserialization failed: {e}")))?;
        drop(store);
        tracing::debug!(cache.key = %key, "Cache hit");
        Ok(Some(value))
    }

    /// Remove a single entry
    pub async fn invalidate(&self, key: &CacheKey) {
        self.store.write().await.pop(&key.to_string());
    }

    /// Remove every entry of one account, returning how many were dropped
    pub async fn invalidate_user(&self, open_id: &str) -> usize {
        let prefix = CacheKey::user_prefix(open_id);
        let mut store = self.store.write().await;
        let keys: Vec<String> = store
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &keys {
            store.pop(key);
        }
        keys.len()
    }

    /// Whether a live entry exists
    pub async fn exists(&self, key: &CacheKey) -> bool {
        self.ttl(key).await.is_some()
    }

    /// Remaining TTL of a live entry, without touching LRU order
    pub async fn ttl(&self, key: &CacheKey) -> Option<Duration> {
        let store = self.store.read().await;
        store
            .peek(&key.to_string())
            .filter(|entry| !entry.is_expired())
            .and_then(CacheEntry::remaining_ttl)
    }

    /// Number of stored entries, expired ones included until swept
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Drop every entry
    pub async fn clear_all(&self) {
        self.store.write().await.clear();
    }

    /// Sweep expired entries now, returning how many were removed
    pub async fn cleanup_expired(&self) -> usize {
        Self::sweep(&self.store).await
    }

    async fn sweep(store: &Store) -> usize {
        let mut store_guard = store.write().await;
        let expired_keys: Vec<String> = store_guard
            .iter()
            .filter(|(_, v)| v.is_expired())
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired_keys {
            store_guard.pop(key);
        }
        drop(store_guard);

        if !expired_keys.is_empty() {
            tracing::debug!("Cleaned up {} expired cache entries", expired_keys.len());
        }
        expired_keys.len()
    }
}

impl Drop for InMemoryCache {
    fn drop(&mut self) {
        // Only the last clone holds the final Arc; earlier drops leave the task running
        if let Some(tx) = self.shutdown_tx.take() {
            if let Ok(tx) = Arc::try_unwrap(tx) {
                if let Err(e) = tx.try_send(()) {
                    tracing::debug!(error = ?e, "Cache shutdown signal send failed (channel likely closed)");
                }
            }
        }
    }
}
