//! Bounded least-recently-used cache
//!
//! Backs search-result memoization so repeated queries within a session
//! do not spend API quota. The cache itself is not synchronized; callers
//! that share one across tasks wrap it in a mutex.

use std::borrow::Borrow;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// A fixed-capacity cache that evicts the least recently used entry
/// once full. Both reads and writes count as use.
pub struct LruCache<K, V> {
    capacity: usize,
    map: HashMap<K, V>,
    // Recency order, most recent at the back
    order: VecDeque<K>,
}

impl<K: Clone + Eq + Hash, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be positive");
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Look up a key, marking it most recently used on a hit
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        if self.map.contains_key(key) {
            self.promote(key);
        }
        self.map.get(key)
    }

    /// Insert or replace an entry, evicting the least recently used
    /// entry if the cache is full
    pub fn put(&mut self, key: K, value: V) {
        if self.map.insert(key.clone(), value).is_some() {
            self.promote(&key);
            return;
        }

        if self.map.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }
        self.order.push_back(key);
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn promote<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        if let Some(pos) = self.order.iter().position(|k| k.borrow() == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);

        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b"), Some(&2));
        assert_eq!(cache.get("c"), Some(&3));
    }

    #[test]
    fn get_refreshes_recency() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);

        // Touch "a" so "b" becomes the eviction candidate
        assert_eq!(cache.get("a"), Some(&1));
        cache.put("c", 3);

        assert_eq!(cache.get("a"), Some(&1));
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn put_replaces_existing_value_without_eviction() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 10);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(&10));
        assert_eq!(cache.get("b"), Some(&2));
    }

    #[test]
    fn replacing_promotes_the_key() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 10);
        cache.put("c", 3);

        // "b" was least recently used after "a" got rewritten
        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a"), Some(&10));
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn zero_capacity_is_rejected() {
        let _ = LruCache::<String, ()>::new(0);
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut cache = LruCache::new(4);
        cache.put(1, "x");
        cache.put(2, "y");
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&1).is_none());
    }
}
