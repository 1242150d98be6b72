//! In-memory cache of document source responses.
//!
//! Responses are cached as raw bytes keyed by the query that produced them, and expire after a
//! fixed lifespan. The cache is shared between request handlers.

use crate::cli::CommandLineArgs;
use crate::metrics::{COLLECTION_CACHE_HITS, COLLECTION_CACHE_MISSES};

use bytes::Bytes;
use cached::{Cached, TimedSizedCache};
use std::sync::Mutex;

/// Cache of source responses.
pub struct CollectionCache {
    entries: Mutex<TimedSizedCache<String, Bytes>>,
}

impl std::fmt::Debug for CollectionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionCache").finish_non_exhaustive()
    }
}

impl CollectionCache {
    /// Create a cache holding up to `size` responses for `lifespan` seconds each.
    pub fn new(size: usize, lifespan: u64) -> Self {
        Self {
            entries: Mutex::new(TimedSizedCache::with_size_and_lifespan(size.max(1), lifespan)),
        }
    }

    /// Create a cache configured from command line arguments.
    pub fn from_args(args: &CommandLineArgs) -> Self {
        Self::new(args.collection_cache_size, args.collection_cache_ttl)
    }

    /// Lock the cache entries.
    ///
    /// The cache holds no invariants that a panicking holder could break, so a poisoned lock is
    /// recovered.
    fn lock(&self) -> std::sync::MutexGuard<'_, TimedSizedCache<String, Bytes>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the cached response for a query, if present and not expired.
    ///
    /// # Arguments
    ///
    /// * `collection`: Collection queried, used to label metrics
    /// * `key`: Cache key of the query
    pub fn get(&self, collection: &str, key: &str) -> Option<Bytes> {
        let value = self.lock().cache_get(key).cloned();
        match value {
            Some(_) => COLLECTION_CACHE_HITS.with_label_values(&[collection]).inc(),
            None => COLLECTION_CACHE_MISSES
                .with_label_values(&[collection])
                .inc(),
        }
        value
    }

    /// Store a response.
    pub fn set(&self, key: &str, value: Bytes) {
        self.lock().cache_set(key.to_string(), value);
    }

    /// Remove all cached responses.
    pub fn clear(&self) {
        self.lock().cache_clear();
    }

    /// Number of cached responses, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().cache_size()
    }

    /// Whether the cache holds no responses.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let cache = CollectionCache::new(4, 60);
        assert!(cache.is_empty());
        assert_eq!(None, cache.get("villages", "villages"));
        cache.set("villages", Bytes::from_static(b"[]"));
        assert_eq!(Some(Bytes::from_static(b"[]")), cache.get("villages", "villages"));
        assert_eq!(1, cache.len());
    }

    #[test]
    fn test_clear() {
        let cache = CollectionCache::new(4, 60);
        cache.set("villages", Bytes::from_static(b"[]"));
        cache.set("claims", Bytes::from_static(b"[]"));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(None, cache.get("claims", "claims"));
    }

    #[test]
    fn test_size_limit() {
        let cache = CollectionCache::new(2, 60);
        cache.set("a", Bytes::from_static(b"1"));
        cache.set("b", Bytes::from_static(b"2"));
        cache.set("c", Bytes::from_static(b"3"));
        assert_eq!(2, cache.len());
        assert_eq!(None, cache.get("a", "a"));
        assert_eq!(Some(Bytes::from_static(b"3")), cache.get("c", "c"));
    }

    #[test]
    fn test_expiry() {
        let cache = CollectionCache::new(2, 0);
        cache.set("a", Bytes::from_static(b"1"));
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert_eq!(None, cache.get("a", "a"));
    }
}
