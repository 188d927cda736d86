//! Recency List Module
//!
//! Doubly linked list ordering cache entries from most recently used to
//! least recently used.
//!
//! Nodes live in a `Vec` arena and link to each other by slot index, so the
//! index map can hold plain `NodeId` handles without sharing ownership of the
//! nodes. Slots `0` and `1` are the head and tail sentinels: they never carry
//! an entry, which keeps splicing free of boundary special cases.
//!
//! ```text
//!   HEAD <-> [MRU] <-> ... <-> [LRU] <-> TAIL
//! ```

use std::iter::FusedIterator;

use crate::cache::CacheEntry;

/// Arena slot of the head sentinel.
const HEAD: usize = 0;
/// Arena slot of the tail sentinel.
const TAIL: usize = 1;

// == Node Handle ==
/// Stable handle to a live node in a [`RecencyList`].
///
/// A handle stays valid until its node is evicted; afterwards the slot may
/// be recycled for a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena slot this handle points at.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Node<K, V> {
    entry: Option<CacheEntry<K, V>>,
    prev: usize,
    next: usize,
}

impl<K, V> Node<K, V> {
    fn sentinel() -> Self {
        Self {
            entry: None,
            prev: HEAD,
            next: TAIL,
        }
    }
}

// == Recency List ==
/// Arena-backed doubly linked list with head/tail sentinels.
///
/// - Front (after `HEAD`) = most recently used
/// - Back (before `TAIL`) = least recently used
#[derive(Debug)]
pub struct RecencyList<K, V> {
    /// Node storage; slots `HEAD` and `TAIL` are reserved
    nodes: Vec<Node<K, V>>,
    /// Vacated slots available for reuse
    free: Vec<usize>,
    /// Number of live (non-sentinel) nodes
    len: usize,
}

impl<K, V> RecencyList<K, V> {
    // == Constructor ==
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity + 2);
        nodes.push(Node::sentinel());
        nodes.push(Node::sentinel());
        Self {
            nodes,
            free: Vec::new(),
            len: 0,
        }
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    /// Returns true when only the sentinels remain.
    pub fn is_empty(&self) -> bool {
        self.nodes[HEAD].next == TAIL
    }

    // == Push Front ==
    /// Stores `entry` in a fresh node at the most recently used position.
    pub fn push_front(&mut self, entry: CacheEntry<K, V>) -> NodeId {
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx].entry = Some(entry);
                idx
            }
            None => {
                self.nodes.push(Node {
                    entry: Some(entry),
                    prev: HEAD,
                    next: TAIL,
                });
                self.nodes.len() - 1
            }
        };
        self.insert_at_head(idx);
        self.len += 1;
        NodeId(idx)
    }

    // == Move To Front ==
    /// Promotes a live node to the most recently used position.
    ///
    /// Returns false if `id` does not refer to a live node.
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        if !self.is_live(id.0) {
            return false;
        }
        if self.nodes[HEAD].next != id.0 {
            self.remove(id.0);
            self.insert_at_head(id.0);
        }
        true
    }

    // == Pop Back ==
    /// Detaches the least recently used node and frees its slot.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<CacheEntry<K, V>> {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            return None;
        }
        self.remove(idx);
        let entry = self.nodes[idx].entry.take();
        self.free.push(idx);
        self.len -= 1;
        entry
    }

    // == Accessors ==
    /// Returns the entry behind `id`, if it is live.
    pub fn get(&self, id: NodeId) -> Option<&CacheEntry<K, V>> {
        self.nodes.get(id.0).and_then(|node| node.entry.as_ref())
    }

    /// Returns a mutable reference to the entry behind `id`, if it is live.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut CacheEntry<K, V>> {
        self.nodes.get_mut(id.0).and_then(|node| node.entry.as_mut())
    }

    /// Returns the most recently used entry.
    pub fn front(&self) -> Option<&CacheEntry<K, V>> {
        self.nodes[self.nodes[HEAD].next].entry.as_ref()
    }

    /// Returns the least recently used entry.
    pub fn back(&self) -> Option<&CacheEntry<K, V>> {
        self.nodes[self.nodes[TAIL].prev].entry.as_ref()
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            current: self.nodes[HEAD].next,
            remaining: self.len,
        }
    }

    // == Link Primitives ==
    fn is_live(&self, idx: usize) -> bool {
        self.nodes
            .get(idx)
            .map(|node| node.entry.is_some())
            .unwrap_or(false)
    }

    /// Unlinks `idx` by joining its neighbours. The slot keeps its entry.
    fn remove(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    /// Links `idx` directly after the head sentinel.
    fn insert_at_head(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }

    /// Panics if the links, sentinels or node count are inconsistent.
    #[cfg(test)]
    pub(crate) fn validate_invariants(&self) {
        assert!(self.nodes[HEAD].entry.is_none(), "head sentinel holds data");
        assert!(self.nodes[TAIL].entry.is_none(), "tail sentinel holds data");

        let mut count = 0;
        let mut prev = HEAD;
        let mut current = self.nodes[HEAD].next;
        while current != TAIL {
            assert!(count <= self.len, "cycle in recency list");
            assert_eq!(self.nodes[current].prev, prev, "broken prev link");
            assert!(self.nodes[current].entry.is_some(), "linked node is empty");
            count += 1;
            prev = current;
            current = self.nodes[current].next;
        }
        assert_eq!(self.nodes[TAIL].prev, prev, "tail not linked to last node");
        assert_eq!(count, self.len, "len does not match linked nodes");
        assert_eq!(
            self.len + self.free.len() + 2,
            self.nodes.len(),
            "slots leaked"
        );
    }
}

impl<K, V> Default for RecencyList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
/// Iterator over entries from most to least recently used.
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    current: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a CacheEntry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == TAIL {
            return None;
        }
        let node = &self.nodes[self.current];
        self.current = node.next;
        self.remaining -= 1;
        node.entry.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
