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

use std::{borrow::Borrow, hash::Hash};

use hashbrown::HashMap;
use wmclient_common::{strict_assert, strict_assert_eq};

use crate::arena::{SlotArena, SlotId};

struct Entry<K, V> {
    key: K,
    value: V,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Single-threaded LRU core.
///
/// The index and the recency list are two views over the same arena: the index maps a key to the slot holding its
/// entry, and every entry links to its neighbours by [`SlotId`]. `head` is the most recently used entry, `tail` the
/// least recently used one.
pub struct LruCore<K, V> {
    index: HashMap<K, SlotId>,
    arena: SlotArena<Entry<K, V>>,

    head: Option<SlotId>,
    tail: Option<SlotId>,

    capacity: usize,
}

impl<K, V> LruCore<K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn new(capacity: usize) -> Self {
        strict_assert!(capacity > 0);
        Self {
            index: HashMap::new(),
            arena: SlotArena::new(),
            head: None,
            tail: None,
            capacity,
        }
    }

    /// Get the value of `key` and promote it to the most recently used position.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        self.move_to_head(id);
        Some(&self.arena[id].value)
    }

    /// Get the value of `key` without touching the recency order.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        Some(&self.arena[id].value)
    }

    /// Insert or update `key`, returning the evicted entry if the insertion overflowed the capacity.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&id) = self.index.get(&key) {
            self.arena[id].value = value;
            self.move_to_head(id);
            return None;
        }

        let evicted = if self.index.len() >= self.capacity {
            self.pop_tail()
        } else {
            None
        };

        let id = self.arena.insert(Entry {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.index.insert(key, id);
        self.attach_head(id);

        strict_assert!(self.index.len() <= self.capacity);
        strict_assert_eq!(self.index.len(), self.arena.len());

        evicted
    }

    /// Empty the cache, handing back the previous contents so the caller decides where they are dropped.
    pub fn clear(&mut self) -> Self {
        std::mem::replace(self, Self::new(self.capacity))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from the most recently used to the least recently used.
    pub fn keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let entry = &self.arena[id];
            keys.push(entry.key.clone());
            cursor = entry.next;
        }
        keys
    }

    fn pop_tail(&mut self) -> Option<(K, V)> {
        let id = self.tail?;
        self.detach(id);
        let entry = self.arena.remove(id)?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    fn move_to_head(&mut self, id: SlotId) {
        if self.head == Some(id) {
            return;
        }
        self.detach(id);
        self.attach_head(id);
    }

    fn detach(&mut self, id: SlotId) {
        let (prev, next) = {
            let entry = &mut self.arena[id];
            (entry.prev.take(), entry.next.take())
        };
        match prev {
            Some(prev) => self.arena[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.arena[next].prev = prev,
            None => self.tail = prev,
        }
    }

    fn attach_head(&mut self, id: SlotId) {
        {
            let entry = &mut self.arena[id];
            entry.prev = None;
            entry.next = self.head;
        }
        match self.head {
            Some(head) => self.arena[head].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    impl<K, V> LruCore<K, V>
    where
        K: Hash + Eq + Clone,
    {
        fn assert_invariants(&self) {
            assert!(self.index.len() <= self.capacity);
            assert_eq!(self.head.is_none(), self.index.is_empty());
            assert_eq!(self.tail.is_none(), self.index.is_empty());

            // Walk forward and backward, both must visit every indexed entry exactly once.
            let forward = self.keys();
            assert_eq!(forward.len(), self.index.len());
            assert!(forward.iter().all_unique());
            assert!(forward.iter().all(|k| self.index.contains_key(k)));

            let mut backward = vec![];
            let mut cursor = self.tail;
            while let Some(id) = cursor {
                backward.push(self.arena[id].key.clone());
                cursor = self.arena[id].prev;
            }
            backward.reverse();
            assert!(forward == backward);
        }
    }

    fn keys(lru: &LruCore<u64, u64>) -> Vec<u64> {
        lru.keys()
    }

    #[test]
    fn test_lru_order() {
        let mut lru = LruCore::new(4);

        // [3, 2, 1, 0]
        for i in 0..4 {
            assert!(lru.put(i, i).is_none());
        }
        assert_eq!(keys(&lru), vec![3, 2, 1, 0]);
        lru.assert_invariants();

        // [0, 3, 2, 1]
        assert_eq!(lru.get(&0), Some(&0));
        assert_eq!(keys(&lru), vec![0, 3, 2, 1]);

        // [4, 0, 3, 2], evict 1
        assert_eq!(lru.put(4, 4), Some((1, 1)));
        assert_eq!(keys(&lru), vec![4, 0, 3, 2]);
        lru.assert_invariants();

        // [2, 4, 0, 3], update in place
        assert!(lru.put(2, 20).is_none());
        assert_eq!(keys(&lru), vec![2, 4, 0, 3]);
        assert_eq!(lru.peek(&2), Some(&20));
        assert_eq!(lru.len(), 4);

        // peek does not promote
        assert_eq!(lru.peek(&3), Some(&3));
        assert_eq!(keys(&lru), vec![2, 4, 0, 3]);

        // get of tail, get of head
        lru.get(&3);
        assert_eq!(keys(&lru), vec![3, 2, 4, 0]);
        lru.get(&3);
        assert_eq!(keys(&lru), vec![3, 2, 4, 0]);
        lru.assert_invariants();

        assert!(lru.get(&42).is_none());
    }

    #[test]
    fn test_lru_capacity_one() {
        let mut lru = LruCore::new(1);
        assert!(lru.put(1, 1).is_none());
        assert_eq!(lru.put(2, 2), Some((1, 1)));
        assert_eq!(keys(&lru), vec![2]);
        assert!(lru.put(2, 3).is_none());
        assert_eq!(lru.peek(&2), Some(&3));
        lru.assert_invariants();
    }

    #[test]
    fn test_lru_clear() {
        let mut lru = LruCore::new(8);
        for i in 0..8 {
            lru.put(i, i);
        }
        let old = lru.clear();
        assert_eq!(old.len(), 8);
        assert_eq!(old.capacity(), 8);
        assert_eq!(lru.len(), 0);
        assert!(keys(&lru).is_empty());
        assert!((0..8).all(|i| lru.peek(&i).is_none()));
        lru.assert_invariants();

        // Usable after clear.
        lru.put(1, 1);
        assert_eq!(keys(&lru), vec![1]);
        lru.assert_invariants();
    }

    #[test]
    fn test_lru_borrowed_key() {
        let mut lru: LruCore<String, u64> = LruCore::new(2);
        lru.put("a".to_string(), 1);
        lru.put("b".to_string(), 2);
        assert_eq!(lru.get("a"), Some(&1));
        lru.put("c".to_string(), 3);
        assert!(lru.peek("b").is_none());
        assert_eq!(lru.keys(), vec!["c".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_lru_random_ops() {
        use rand::{rngs::SmallRng, Rng, SeedableRng};

        let mut rng = SmallRng::seed_from_u64(42);
        let mut lru = LruCore::new(16);
        for _ in 0..10_000 {
            let key = rng.random_range(0..64u64);
            match rng.random_range(0..10) {
                0 => drop(lru.clear()),
                1..=4 => {
                    lru.get(&key);
                }
                _ => {
                    lru.put(key, key);
                }
            }
            assert!(lru.len() <= lru.capacity());
        }
        lru.assert_invariants();
    }
}
