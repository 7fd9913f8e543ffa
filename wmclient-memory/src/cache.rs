// Copyright 2026 wmclient Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{borrow::Borrow, fmt::Debug, hash::Hash};

use parking_lot::Mutex;

use crate::lru::LruCore;

/// Capacity used when a cache is created with a zero capacity.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// A fixed-capacity, thread-safe least-recently-used cache.
///
/// All operations take the same mutex for their full duration, so each of them is atomic with respect to every other
/// operation on the same instance. None of them performs I/O or fails.
///
/// [`LruCache::get`] is a *mutating* read: a hit promotes the entry to the most recently used position.
///
/// ```rust
/// # use wmclient_memory::LruCache;
/// let cache = LruCache::new(2);
/// cache.put("a", 1);
/// cache.put("b", 2);
/// assert_eq!(cache.get("a"), Some(1));
/// cache.put("c", 3);
/// assert_eq!(cache.get("b"), None);
/// ```
pub struct LruCache<K, V> {
    inner: Mutex<LruCore<K, V>>,
}

impl<K, V> Debug for LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("LruCache")
            .field("len", &inner.len())
            .field("capacity", &inner.capacity())
            .finish()
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A zero capacity falls back to [`DEFAULT_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity > 0 { capacity } else { DEFAULT_CAPACITY };
        Self {
            inner: Mutex::new(LruCore::new(capacity)),
        }
    }

    /// Get a clone of the cached value and promote the entry to the most recently used position.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Get a clone of the cached value without changing the recency order.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().peek(key).cloned()
    }

    /// Insert or replace the value of `key` and promote it to the most recently used position.
    ///
    /// Inserting a new key into a full cache evicts the least recently used entry first.
    pub fn put(&self, key: K, value: V) {
        let evicted = self.inner.lock().put(key, value);
        // Drop the evicted entry outside the lock section.
        if evicted.is_some() {
            tracing::trace!("[lru]: evicted least recently used entry");
        }
        drop(evicted);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let old = self.inner.lock().clear();
        // Drop the old entries outside the lock section.
        drop(old);
    }

    /// Current entry count.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the cache holds no entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum entry count.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Keys ordered from the most recently used to the least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().keys()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    fn is_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_send_sync_static() {
        is_send_sync_static::<LruCache<String, Arc<String>>>();
    }

    fn filled(capacity: usize, count: usize) -> LruCache<String, String> {
        let cache = LruCache::new(capacity);
        for i in 0..count {
            cache.put(i.to_string(), format!("value-{i}"));
        }
        cache
    }

    #[test]
    fn test_zero_capacity_falls_back_to_default() {
        let cache: LruCache<u64, u64> = LruCache::new(0);
        assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
        assert_eq!(LruCache::<u64, u64>::default().capacity(), DEFAULT_CAPACITY);
        assert_eq!(LruCache::<u64, u64>::new(7).capacity(), 7);
    }

    #[test]
    fn test_insert_over_capacity() {
        let cache = filled(5, 6);
        assert_eq!(cache.len(), 5);
        assert!(cache.get("0").is_none());
        assert_eq!(cache.get("5").as_deref(), Some("value-5"));
        for i in 1..6 {
            assert!(cache.get(&i.to_string()).is_some());
        }
    }

    #[test]
    fn test_update_does_not_insert() {
        let cache = filled(5, 5);
        cache.put("2".to_string(), "updated".to_string());
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.get("2").as_deref(), Some("updated"));
        // "2" is now the most recent, so "0" is still the first to go.
        cache.put("5".to_string(), "value-5".to_string());
        assert!(cache.get("0").is_none());
        assert!(cache.get("2").is_some());
    }

    #[test]
    fn test_get_promotes() {
        let cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.get("a"), Some(1));
        cache.put("c", 3);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_peek_does_not_promote() {
        let cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.peek("a"), Some(1));
        cache.put("c", 3);
        assert_eq!(cache.peek("a"), None);
        assert_eq!(cache.keys(), vec!["c", "b"]);
    }

    #[test]
    fn test_clear() {
        let cache = filled(5, 5);
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 5);
        assert!((0..5).all(|i| cache.get(&i.to_string()).is_none()));
    }

    #[test]
    fn test_shared_between_threads() {
        let cache = Arc::new(LruCache::new(64));
        let handles = (0..4u64)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..1000u64 {
                        cache.put(t * 1000 + i, i);
                        cache.get(&(t * 1000 + i / 2));
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 64);
        assert_eq!(cache.keys().len(), 64);
    }
}
