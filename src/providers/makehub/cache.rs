//! Router model cache
//!
//! LRU of fetched catalogs keyed by router name + base URL, with a TTL.
//! Stale entries are still served by [`ModelCache::peek`] so synchronous
//! callers can resolve a model without touching the network.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;

use crate::error::LlmError;
use crate::types::ModelRecord;

const CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(16) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Debug, Clone)]
struct CacheEntry {
    models: ModelRecord,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(models: ModelRecord) -> Self {
        Self {
            models,
            fetched_at: Utc::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => Utc::now() - self.fetched_at >= ttl,
            // TTL beyond chrono's range never expires
            Err(_) => false,
        }
    }
}

/// Cache of router model catalogs
#[derive(Debug)]
pub struct ModelCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl ModelCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(CACHE_CAPACITY)),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return a fresh cached catalog, or run `fetch` and cache its result.
    ///
    /// Failed fetches are not cached. The lock is released while fetching, so
    /// concurrent misses may fetch twice; the last write wins.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<ModelRecord, LlmError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ModelRecord, LlmError>>,
    {
        {
            let mut entries = self.lock();
            if let Some(entry) = entries.get(key) {
                if !entry.is_expired(self.ttl) {
                    tracing::trace!(key, "model cache hit");
                    return Ok(entry.models.clone());
                }
                tracing::debug!(key, fetched_at = %entry.fetched_at, "model cache entry expired");
            }
        }

        let models = fetch().await?;
        self.lock()
            .put(key.to_string(), CacheEntry::new(models.clone()));
        Ok(models)
    }

    /// Cached catalog regardless of age
    pub fn peek(&self, key: &str) -> Option<ModelRecord> {
        self.lock().peek(key).map(|entry| entry.models.clone())
    }

    /// When the cached catalog for `key` was fetched
    pub fn fetched_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.lock().peek(key).map(|entry| entry.fetched_at)
    }

    /// Store a catalog obtained elsewhere
    pub fn insert(&self, key: &str, models: ModelRecord) {
        self.lock().put(key.to_string(), CacheEntry::new(models));
    }

    /// Drop the cached catalog for `key`; returns whether one was cached.
    pub fn flush(&self, key: &str) -> bool {
        let removed = self.lock().pop(key).is_some();
        tracing::debug!(key, removed, "flushed router models");
        removed
    }

    pub fn flush_all(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModelInfo;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(id: &str) -> ModelRecord {
        let mut models = ModelRecord::new();
        models.insert(id.to_string(), ModelInfo::default());
        models
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let cache = ModelCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let models = cache
                .get_or_fetch("makehub", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(record("a/b"))
                })
                .await
                .unwrap();
            assert!(models.contains_key("a/b"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_ttl_always_refetches() {
        let cache = ModelCache::new(Duration::ZERO);
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            cache
                .get_or_fetch("makehub", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(record("a/b"))
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(cache.peek("makehub").is_some());
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = ModelCache::new(Duration::from_secs(60));
        let result = cache
            .get_or_fetch("makehub", || async {
                Err(LlmError::HttpError("down".into()))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.peek("makehub").is_none());
    }

    #[test]
    fn flush_removes_entry() {
        let cache = ModelCache::new(Duration::from_secs(60));
        cache.insert("makehub", record("a/b"));
        assert!(cache.fetched_at("makehub").is_some());
        assert!(cache.flush("makehub"));
        assert!(!cache.flush("makehub"));
        assert!(cache.peek("makehub").is_none());
    }

    #[test]
    fn flush_all_clears_every_router() {
        let cache = ModelCache::new(Duration::from_secs(60));
        cache.insert("makehub", record("a/b"));
        cache.insert("other", record("c/d"));
        cache.flush_all();
        assert!(cache.peek("makehub").is_none());
        assert!(cache.peek("other").is_none());
    }
}
