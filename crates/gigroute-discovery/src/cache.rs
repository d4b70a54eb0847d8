//! TTL-keyed result cache wrapping external catalog lookups.
//!
//! Keys are normalized `(endpoint, sorted query parameters)` tuples so the
//! same logical lookup always hits the same entry regardless of parameter
//! order. Hit and miss counters are cumulative across the process lifetime
//! and feed discovery stats. Reads take a shared lock; writes to the same
//! key are last-writer-wins under the exclusive lock, never torn.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Default entry lifetime: one hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

/// Cumulative cache counters surfaced in discovery stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheStats {
    pub keys: usize,
    pub hits: u64,
    pub misses: u64,
}

/// An in-process TTL cache with hit/miss accounting.
#[derive(Debug)]
pub struct ResultCache<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T: Clone> ResultCache<T> {
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Looks up a key, counting a hit or miss. Expired entries count as
    /// misses and are evicted on the spot.
    pub async fn get(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(key) {
                if entry.expires_at > now {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.value.clone());
                }
            } else {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        }
        // Entry exists but has expired: evict under the write lock. Another
        // writer may have refreshed it in the gap; only remove if still stale.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.expires_at > now {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            entries.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Stores a value under the default TTL.
    pub async fn insert(&self, key: String, value: T) {
        self.insert_with_ttl(key, value, self.default_ttl).await;
    }

    /// Stores a value with an explicit TTL. Last writer wins.
    pub async fn insert_with_ttl(&self, key: String, value: T, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Drops every entry. Counters survive a clear.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Snapshot of key count and cumulative hit/miss counters.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            keys: self.entries.read().await.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Builds a normalized cache key from an endpoint and query parameters.
///
/// Parameters are sorted by name (then value) so logically identical lookups
/// share a key.
#[must_use]
pub fn cache_key(endpoint: &str, params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<(&str, &str)> = params.to_vec();
    sorted.sort_unstable();
    let mut key = String::from(endpoint);
    for (name, value) in sorted {
        key.push('&');
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn miss_then_hit_counts_both() {
        let cache = ResultCache::new(DEFAULT_TTL);
        assert_eq!(cache.get("k").await, None);
        cache.insert("k".to_owned(), 7u32).await;
        assert_eq!(cache.get("k").await, Some(7));

        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.keys, 1);
    }

    #[tokio::test]
    async fn expired_entries_count_as_misses_and_are_evicted() {
        let cache = ResultCache::new(DEFAULT_TTL);
        cache
            .insert_with_ttl("k".to_owned(), 7u32, Duration::from_millis(0))
            .await;
        assert_eq!(cache.get("k").await, None);

        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.keys, 0, "expired entry should be evicted");
    }

    #[tokio::test]
    async fn clear_drops_entries_but_keeps_counters() {
        let cache = ResultCache::new(DEFAULT_TTL);
        cache.insert("k".to_owned(), 1u32).await;
        let _ = cache.get("k").await;
        cache.clear().await;

        let stats = cache.stats().await;
        assert_eq!(stats.keys, 0);
        assert_eq!(stats.hits, 1, "counters are cumulative across clears");
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn last_writer_wins_for_the_same_key() {
        let cache = ResultCache::new(DEFAULT_TTL);
        cache.insert("k".to_owned(), 1u32).await;
        cache.insert("k".to_owned(), 2u32).await;
        assert_eq!(cache.get("k").await, Some(2));
    }

    #[test]
    fn cache_keys_normalize_parameter_order() {
        let a = cache_key("events", &[("from", "2026-09-01"), ("performer", "X")]);
        let b = cache_key("events", &[("performer", "X"), ("from", "2026-09-01")]);
        assert_eq!(a, b);
    }

    #[test]
    fn cache_keys_distinguish_endpoints_and_values() {
        let a = cache_key("events", &[("performer", "X")]);
        let b = cache_key("demo-events", &[("performer", "X")]);
        let c = cache_key("events", &[("performer", "Y")]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
