//! Keyed store with per-entry time-to-live.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::warn;

use super::clock::{Clock, SystemClock};

/// A cached value with the time it was stored and how long it stays fresh.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Fresh while `now - stored_at < ttl`.
    ///
    /// A clock that moved backwards counts as zero elapsed time.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let elapsed = (now - self.stored_at).to_std().unwrap_or(Duration::ZERO);
        elapsed < self.ttl
    }
}

/// Thread-safe TTL cache.
///
/// - `get` returns a miss for keys never stored and for expired entries alike
/// - `put` always replaces the entry for its key (last writer wins)
/// - entries are never evicted other than by [`purge_expired`](Self::purge_expired) or
///   [`clear`](Self::clear)
///
/// Values are cloned out on read; wrap large values in `Arc`.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("TTL cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("TTL cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// The fresh value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_entry(key).map(|entry| entry.value)
    }

    /// The fresh entry for `key`, including when it was stored.
    pub fn get_entry(&self, key: &K) -> Option<CacheEntry<V>> {
        let now = self.clock.now();
        self.read()
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .cloned()
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
            ttl,
        };
        self.write().insert(key, entry);
    }

    /// Drop expired entries; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.entries.read().map(|entries| entries.len()).unwrap_or(0);
        f.debug_struct("TtlCache").field("entries", &len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn cache() -> (Arc<ManualClock>, TtlCache<&'static str, u32>) {
        let clock = Arc::new(ManualClock::default());
        let cache = TtlCache::with_clock(clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_miss_when_never_set() {
        let (_, cache) = cache();
        assert_eq!(cache.get(&"btc"), None);
    }

    #[test]
    fn test_hit_before_ttl() {
        let (clock, cache) = cache();
        cache.put("btc", 1, Duration::from_secs(60));

        clock.advance(chrono::Duration::seconds(59));
        assert_eq!(cache.get(&"btc"), Some(1));
    }

    #[test]
    fn test_miss_at_exactly_ttl() {
        let (clock, cache) = cache();
        cache.put("btc", 1, Duration::from_secs(60));

        clock.advance(chrono::Duration::seconds(60));
        assert_eq!(cache.get(&"btc"), None);
        // still present until purged or overwritten
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_replaces_and_restarts_ttl() {
        let (clock, cache) = cache();
        cache.put("btc", 1, Duration::from_secs(10));
        clock.advance(chrono::Duration::seconds(15));
        cache.put("btc", 2, Duration::from_secs(10));

        let entry = cache.get_entry(&"btc").unwrap();
        assert_eq!(entry.value, 2);
        assert_eq!(entry.stored_at, clock.now());
    }

    #[test]
    fn test_entries_expire_independently() {
        let (clock, cache) = cache();
        cache.put("price", 1, Duration::from_secs(1));
        cache.put("stats", 2, Duration::from_secs(60));

        clock.advance(chrono::Duration::seconds(5));
        assert_eq!(cache.get(&"price"), None);
        assert_eq!(cache.get(&"stats"), Some(2));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_is_never_fresh() {
        let (_, cache) = cache();
        cache.put("btc", 1, Duration::ZERO);
        assert_eq!(cache.get(&"btc"), None);
    }

    #[test]
    fn test_clear() {
        let (_, cache) = cache();
        cache.put("btc", 1, Duration::from_secs(1));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_writers_last_wins() {
        let cache = Arc::new(TtlCache::<u8, usize>::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.put(0, i, Duration::from_secs(60)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.get(&0).is_some());
        assert_eq!(cache.len(), 1);
    }
}
