//! Generic TTL response cache.
//!
//! One [`ResponseCache`] instance is created per data kind (quote,
//! historical, financials, ETF) with an independent key space. Expiry is
//! checked lazily on read; there is no background eviction thread. A stale
//! entry that is never read again is only reclaimed by being overwritten or
//! by process restart — an accepted bounded-growth tradeoff for a
//! single-user desktop process.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::sync::Mutex;

/// Default time-to-live for cached responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Cache entry pairing a payload with the time it was fetched.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    data: V,
    fetched_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn new(data: V) -> Self {
        Self {
            data,
            fetched_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.fetched_at);
        age > TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX)
    }
}

/// In-memory read-through memoization with expiry.
#[derive(Debug)]
pub struct ResponseCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K, V> Default for ResponseCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ResponseCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates an empty cache with the default 60 s TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates an empty cache with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the cached value and its original fetch time, if present and
    /// fresh. A stale entry is evicted and reported as absent.
    pub async fn get(&self, key: &K) -> Option<(V, DateTime<Utc>)> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if !entry.is_stale(self.ttl) => {
                Some((entry.data.clone(), entry.fetched_at))
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores a value, unconditionally overwriting any previous entry and
    /// stamping the current time.
    pub async fn put(&self, key: K, value: V) {
        let mut entries = self.entries.lock().await;
        entries.insert(key, CacheEntry::new(value));
    }

    /// Number of live and stale entries currently held.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
