//! Lightweight LRU map
//!
//! Recency is tracked with a monotonically increasing access counter.
//! Capacities here are small (private channels default to 128), so eviction
//! does a linear scan for the oldest entry.

use std::collections::HashMap;
use std::hash::Hash;

/// A least-recently-used map with a fixed entry capacity
///
/// Unlike a plain cache, `insert` hands back whatever it evicted so owners
/// can keep secondary indexes consistent.
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    /// Storage for cached items
    entries: HashMap<K, LruEntry<V>>,
    /// Maximum number of entries kept after an insert
    capacity: usize,
    /// Access counter for LRU tracking
    access_counter: u64,
}

#[derive(Debug, Clone)]
struct LruEntry<V> {
    value: V,
    last_access: u64,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Create a new LRU map with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(1024)),
            capacity,
            access_counter: 0,
        }
    }

    /// Get a reference to a cached value
    ///
    /// Counts as a use: the entry becomes the most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.access_counter += 1;
        let counter = self.access_counter;
        self.entries.get_mut(key).map(|entry| {
            entry.last_access = counter;
            &entry.value
        })
    }

    /// Look at a value without touching its recency
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// Check if a key exists without updating access time
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or refresh a value at the most recently used end
    ///
    /// If the map then holds more than `capacity` entries, the least recently
    /// used one is removed and returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.access_counter += 1;

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value;
            entry.last_access = self.access_counter;
            return None;
        }

        self.entries.insert(
            key,
            LruEntry {
                value,
                last_access: self.access_counter,
            },
        );

        if self.entries.len() > self.capacity {
            return self.evict_lru();
        }
        None
    }

    /// Remove a specific key
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|e| e.value)
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Values ordered from least to most recently used
    pub fn values(&self) -> Vec<&V> {
        let mut entries: Vec<&LruEntry<V>> = self.entries.values().collect();
        entries.sort_by_key(|e| e.last_access);
        entries.into_iter().map(|e| &e.value).collect()
    }

    /// Keys ordered from least to most recently used
    pub fn keys(&self) -> Vec<K> {
        let mut entries: Vec<(&K, u64)> = self
            .entries
            .iter()
            .map(|(k, e)| (k, e.last_access))
            .collect();
        entries.sort_by_key(|(_, access)| *access);
        entries.into_iter().map(|(k, _)| k.clone()).collect()
    }

    /// Evict the least recently used entry
    fn evict_lru(&mut self) -> Option<(K, V)> {
        let lru_key = self.find_lru_key()?;
        self.entries.remove(&lru_key).map(|e| (lru_key, e.value))
    }

    /// Find the key with the oldest access time
    fn find_lru_key(&self) -> Option<K> {
        self.entries
            .iter()
            .min_by_key(|(_, e)| e.last_access)
            .map(|(k, _)| k.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_basic() {
        let mut cache = LruCache::new(3);

        assert!(cache.insert("a", 1).is_none());
        assert!(cache.insert("b", 2).is_none());
        assert!(cache.insert("c", 3).is_none());

        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), Some(&3));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_lru_eviction_returns_victim() {
        let mut cache = LruCache::new(2);

        cache.insert("a", 1);
        cache.insert("b", 2);

        // Access "a" to make it more recent
        cache.get(&"a");

        // Insert "c", should evict "b" (least recently used)
        assert_eq!(cache.insert("c", 3), Some(("b", 2)));

        assert_eq!(cache.peek(&"a"), Some(&1));
        assert_eq!(cache.peek(&"b"), None);
        assert_eq!(cache.peek(&"c"), Some(&3));
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut cache = LruCache::new(2);

        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.peek(&"a");

        assert_eq!(cache.insert("c", 3), Some(("a", 1)));
    }

    #[test]
    fn test_lru_refresh_existing() {
        let mut cache = LruCache::new(2);

        cache.insert("a", 1);
        cache.insert("b", 2);
        assert!(cache.insert("a", 10).is_none());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.keys(), vec!["b", "a"]);
        assert_eq!(cache.insert("c", 3), Some(("b", 2)));
        assert_eq!(cache.peek(&"a"), Some(&10));
    }

    #[test]
    fn test_values_in_recency_order() {
        let mut cache = LruCache::new(4);

        cache.insert(1, "one");
        cache.insert(2, "two");
        cache.insert(3, "three");
        cache.get(&1);

        assert_eq!(cache.values(), vec![&"two", &"three", &"one"]);
    }
}
