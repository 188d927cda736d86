//! Cache Store Module
//!
//! Main cache engine combining a HashMap index with the recency list.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats, NodeId, RecencyList};
use crate::error::{CacheError, Result};

// == LRU Cache ==
/// Fixed-capacity key/value store with least-recently-used eviction.
///
/// `get` and `put` run in O(1): a hash lookup locates the node handle and
/// a constant number of link updates moves it to the front of the
/// recency list.
pub struct LruCache<K, V> {
    /// Key to node handle; never owns entries
    index: HashMap<K, NodeId>,
    /// Owns the entries, ordered MRU to LRU
    list: RecencyList<K, V>,
    /// Activity counters
    stats: CacheStats,
    /// Maximum number of entries, fixed at construction
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }

        debug!(capacity, "creating LRU cache");
        Ok(Self {
            index: HashMap::with_capacity(capacity),
            list: RecencyList::with_capacity(capacity),
            stats: CacheStats::new(capacity),
            capacity,
        })
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    ///
    /// `None` means the key is not cached.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.touch(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Like [`get`](Self::get), but hands out a mutable reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.touch(key)?;
        self.list.get_mut(id).map(|entry| &mut entry.value)
    }

    // == Put ==
    /// Stores `value` under `key` and marks it most recently used.
    ///
    /// An existing key has its value replaced. A new key arriving while the
    /// cache is full first evicts the least recently used entry.
    pub fn put(&mut self, key: K, value: V) {
        self.push(key, value);
    }

    // == Push ==
    /// Like [`put`](Self::put), but returns the entry evicted to make room.
    ///
    /// Overwriting an existing key never evicts.
    pub fn push(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                entry.replace_value(value);
            }
            self.list.move_to_front(id);
            self.stats.record_update();
            return None;
        }

        let evicted = if self.index.len() >= self.capacity {
            self.evict_lru()
        } else {
            None
        };

        let id = self.list.push_front(CacheEntry::new(key.clone(), value));
        self.index.insert(key, id);
        self.stats.record_insertion();
        evicted
    }

    // == Peek ==
    /// Returns the value for `key` without changing its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    // == Contains ==
    /// Checks whether `key` is cached, without changing its recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Returns the entry that would be evicted next.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Returns the most recently used entry.
    pub fn peek_mru(&self) -> Option<(&K, &V)> {
        self.list.front().map(|entry| (&entry.key, &entry.value))
    }

    // == Iteration ==
    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.list.iter().map(|entry| (&entry.key, &entry.value))
    }

    /// Iterates keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter().map(|entry| &entry.key)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the fixed maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    // == Internals ==
    /// Looks up `key`, records the outcome and promotes a hit.
    fn touch<Q>(&mut self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key) {
            Some(&id) => {
                self.stats.record_hit();
                self.list.move_to_front(id);
                trace!(slot = id.index(), "promoted entry");
                Some(id)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Drops the least recently used entry from both list and index.
    fn evict_lru(&mut self) -> Option<(K, V)> {
        let (key, value) = self.list.pop_back()?.into_pair();
        self.index.remove(&key);
        self.stats.record_eviction();
        debug!(
            remaining = self.index.len(),
            capacity = self.capacity,
            "evicted least recently used entry"
        );
        Some((key, value))
    }

    #[cfg(test)]
    pub(crate) fn validate_invariants(&self) {
        self.list.validate_invariants();
        assert_eq!(self.index.len(), self.list.len(), "index/list size mismatch");
        assert!(self.index.len() <= self.capacity, "capacity exceeded");
        for (key, &id) in &self.index {
            let entry = self.list.get(id).expect("index points at dead node");
            assert!(entry.key == *key, "index points at wrong entry");
        }
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.index.len())
            .field(
                "entries",
                &self
                    .list
                    .iter()
                    .map(|entry| (&entry.key, &entry.value))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
