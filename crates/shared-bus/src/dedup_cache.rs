//! # Time-Bounded Dedup Cache
//!
//! Remembers recently seen keys so that repeated events are reported once.
//!
//! ## Bounds
//!
//! - An entry expires a fixed time after it was written (not after last read).
//! - When full, the least recently used entry is evicted.
//!
//! Both bounds keep memory constant regardless of traffic volume.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

struct Entry {
    value: String,
    written_at: Instant,
}

/// Bounded, expiring set of keys with atomic insert-if-absent.
pub struct TimeBoundedDedupCache {
    entries: Mutex<LruCache<String, Entry>>,
    ttl: Duration,
}

impl TimeBoundedDedupCache {
    /// Default maximum number of remembered keys.
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    /// Default lifetime of a remembered key.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

    /// Create a cache holding at most `max_entries` keys for `ttl` each.
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Insert `key` unless a live entry exists.
    ///
    /// # Returns
    ///
    /// - `None` - the key was absent (or expired) and is now remembered
    /// - `Some(previous)` - the key was already present; nothing changed
    pub fn put_if_absent(&self, key: &str) -> Option<String> {
        self.put_if_absent_at(key, Instant::now())
    }

    /// [`put_if_absent`](Self::put_if_absent) with an explicit clock.
    pub fn put_if_absent_at(&self, key: &str, now: Instant) -> Option<String> {
        let mut entries = self.entries.lock();
        let existing = entries.get(key).map(|entry| {
            let live = now.saturating_duration_since(entry.written_at) < self.ttl;
            (live, entry.value.clone())
        });
        match existing {
            Some((true, previous)) => return Some(previous),
            Some((false, _)) => {
                entries.pop(key);
            }
            None => {}
        }
        entries.put(
            key.to_string(),
            Entry {
                value: key.to_string(),
                written_at: now,
            },
        );
        None
    }

    /// Whether `key` is currently remembered and not expired.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.contains_at(key, Instant::now())
    }

    #[must_use]
    pub fn contains_at(&self, key: &str, now: Instant) -> bool {
        self.entries
            .lock()
            .peek(key)
            .is_some_and(|e| now.saturating_duration_since(e.written_at) < self.ttl)
    }

    /// Drop all expired entries.
    pub fn purge_expired(&self) {
        self.purge_expired_at(Instant::now());
    }

    pub fn purge_expired_at(&self, now: Instant) {
        let mut entries = self.entries.lock();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, e)| now.saturating_duration_since(e.written_at) >= self.ttl)
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            entries.pop(&key);
        }
    }

    /// Number of stored entries, including any not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for TimeBoundedDedupCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ENTRIES, Self::DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_insert_is_absent() {
        let cache = TimeBoundedDedupCache::default();
        assert_eq!(cache.put_if_absent("a"), None);
        assert_eq!(cache.put_if_absent("a").as_deref(), Some("a"));
        assert!(cache.contains("a"));
    }

    #[test]
    fn test_expired_entry_is_absent() {
        let cache = TimeBoundedDedupCache::new(10, Duration::from_secs(10));
        let t0 = Instant::now();
        assert_eq!(cache.put_if_absent_at("a", t0), None);
        assert!(cache.put_if_absent_at("a", t0 + Duration::from_secs(9)).is_some());
        assert_eq!(cache.put_if_absent_at("a", t0 + Duration::from_secs(10)), None);
        // Re-written at t0+10, so live again until t0+20.
        assert!(cache.contains_at("a", t0 + Duration::from_secs(19)));
    }

    #[test]
    fn test_expiry_is_after_write_not_access() {
        let cache = TimeBoundedDedupCache::new(10, Duration::from_secs(10));
        let t0 = Instant::now();
        cache.put_if_absent_at("a", t0);
        for s in 1..10 {
            assert!(cache.put_if_absent_at("a", t0 + Duration::from_secs(s)).is_some());
        }
        assert_eq!(cache.put_if_absent_at("a", t0 + Duration::from_secs(10)), None);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = TimeBoundedDedupCache::new(2, Duration::from_secs(60));
        cache.put_if_absent("a");
        cache.put_if_absent("b");
        // Touch "a" so "b" is the eviction candidate.
        assert!(cache.put_if_absent("a").is_some());
        cache.put_if_absent("c");

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_purge_expired() {
        let cache = TimeBoundedDedupCache::new(10, Duration::from_secs(5));
        let t0 = Instant::now();
        cache.put_if_absent_at("old", t0);
        cache.put_if_absent_at("new", t0 + Duration::from_secs(4));
        cache.purge_expired_at(t0 + Duration::from_secs(6));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_at("new", t0 + Duration::from_secs(6)));
    }

    #[test]
    fn test_zero_capacity_raised() {
        let cache = TimeBoundedDedupCache::new(0, Duration::from_secs(1));
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_concurrent_put_single_winner() {
        let cache = Arc::new(TimeBoundedDedupCache::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.put_if_absent("token").is_none())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
