//! A bounded, least-recently-used result cache.
//!
//! Lookups share a read lock and only bump an atomic recency stamp; the
//! write lock is held just for the check-then-insert of a new entry.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
struct Entry<V> {
    value: V,
    last_used: AtomicU64,
}

#[derive(Debug)]
pub struct NeighborCache<K, V> {
    capacity: usize,
    clock: AtomicU64,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> NeighborCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// A cache holding at most `capacity` entries. Zero disables caching.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            clock: AtomicU64::new(0),
            entries: RwLock::new(HashMap::with_capacity(capacity.min(1024))),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read();
        entries.get(key).map(|entry| {
            entry.last_used.store(self.tick(), Ordering::Relaxed);
            entry.value.clone()
        })
    }

    /// Insert `value` unless the key is already cached, evicting the least
    /// recently used entry when full. Returns the cached value.
    pub fn insert(&self, key: K, value: V) -> V {
        if self.capacity == 0 {
            return value;
        }

        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&key) {
            existing.last_used.store(self.tick(), Ordering::Relaxed);
            return existing.value.clone();
        }

        if entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            Entry {
                value: value.clone(),
                last_used: AtomicU64::new(self.tick()),
            },
        );
        value
    }

    /// Return the cached value for `key`, computing and caching it on a miss.
    ///
    /// `compute` runs without any lock held; when two callers race on the
    /// same key the first insert wins and both observe it.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = compute()?;
        Ok(self.insert(key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_after_insert() {
        let cache = NeighborCache::new(4);
        assert_eq!(cache.get(&"a"), None);
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = NeighborCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        // touch a so b becomes the oldest
        assert_eq!(cache.get(&"a"), Some(1));
        cache.insert("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = NeighborCache::new(2);
        assert_eq!(cache.insert("a", 1), 1);
        assert_eq!(cache.insert("a", 2), 1);
        assert_eq!(cache.get(&"a"), Some(1));
    }

    #[test]
    fn test_zero_capacity_disables_caching() {
        let cache = NeighborCache::new(0);
        assert_eq!(cache.insert("a", 1), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_or_try_insert_with_computes_once() {
        let cache = NeighborCache::new(4);
        let mut calls = 0;
        let first: Result<i32, ()> = cache.get_or_try_insert_with("k", || {
            calls += 1;
            Ok(7)
        });
        assert_eq!(first, Ok(7));
        let second: Result<i32, ()> = cache.get_or_try_insert_with("k", || Ok(8));
        assert_eq!(second, Ok(7));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache: NeighborCache<&str, i32> = NeighborCache::new(4);
        let failed: Result<i32, &str> = cache.get_or_try_insert_with("k", || Err("boom"));
        assert!(failed.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access_stays_bounded() {
        let cache = Arc::new(NeighborCache::new(8));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        cache.insert((t, i), i);
                        assert!(cache.get(&(t, i)).is_none_or(|v| v == i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.len() <= 8);
    }
}
