use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Expiring key/value store.
///
/// `take` is the atomic get-and-delete the correlation bridge relies on.
pub trait Cache<V>: Send + Sync {
    fn set(&self, key: &str, value: V, ttl: Duration);
    fn take(&self, key: &str) -> Option<V>;
    fn delete(&self, key: &str) -> bool;
    /// Drop expired entries; returns how many were removed.
    fn purge_expired(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-process [`Cache`] backed by `DashMap`. Expiry is lazy on access plus
/// whatever [`Cache::purge_expired`] sweeps.
pub struct MemoryCache<V> {
    entries: DashMap<String, Entry<V>>,
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V: Clone> MemoryCache<V> {
    /// Non-consuming read, for cloneable values.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|e| e.value().is_live(now))
            .map(|e| e.value().value.clone())
    }
}

impl<V: Send + Sync> Cache<V> for MemoryCache<V> {
    fn set(&self, key: &str, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(key.to_string(), Entry { value, expires_at });
    }

    fn take(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.entries
            .remove(key)
            .and_then(|(_, e)| e.is_live(now).then_some(e.value))
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| e.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_removes_entry() {
        let cache = MemoryCache::new();
        cache.set("a", 1u32, Duration::from_secs(60));
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.take("a"), Some(1));
        assert_eq!(cache.take("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn expired_entries_are_invisible_and_purged() {
        let cache = MemoryCache::new();
        cache.set("old", 1u32, Duration::ZERO);
        cache.set("new", 2u32, Duration::from_secs(60));

        assert_eq!(cache.get("old"), None);
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.delete("new"));
        assert!(!cache.delete("new"));
    }

    #[test]
    fn take_of_expired_entry_is_none() {
        let cache = MemoryCache::new();
        cache.set("k", 1u32, Duration::ZERO);
        assert_eq!(cache.take("k"), None);
        assert!(cache.is_empty());
    }
}
