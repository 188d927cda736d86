//! Cache Entry Module
//!
//! Defines the key/value payload carried by each recency list node.

// == Cache Entry ==
/// A single cached key/value pair.
///
/// The key is kept alongside the value so that evicting the tail node
/// can also clear the matching index slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<K, V> {
    /// The lookup key
    pub key: K,
    /// The stored value
    pub value: V,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a new entry for `key` holding `value`.
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    // == Replace Value ==
    /// Stores a new value, returning the previous one.
    pub fn replace_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    /// Splits the entry into its key and value.
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("key", 42);

        assert_eq!(entry.key, "key");
        assert_eq!(entry.value, 42);
    }

    #[test]
    fn test_entry_replace_value() {
        let mut entry = CacheEntry::new("key", 1);

        let old = entry.replace_value(2);

        assert_eq!(old, 1);
        assert_eq!(entry.value, 2);
        assert_eq!(entry.key, "key");
    }

    #[test]
    fn test_entry_into_pair() {
        let entry = CacheEntry::new(String::from("a"), vec![1, 2, 3]);

        let (key, value) = entry.into_pair();
        assert_eq!(key, "a");
        assert_eq!(value, vec![1, 2, 3]);
    }
}
