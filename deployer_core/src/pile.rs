use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// A keyed container that provides both map-based access by key
/// and ordered access in insertion order.
///
/// Not synchronized; owners wrap it in whatever lock guards their state.
#[derive(Debug, Clone)]
pub struct Pile<K, T> {
    // Map for direct key-based access
    items: HashMap<K, T>,
    // Ordered sequence of keys for maintaining insertion order
    order: VecDeque<K>,
}

impl<K, T> Pile<K, T>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Insert an item under `key`.
    ///
    /// Replacing an existing item keeps its original position.
    pub fn insert(&mut self, key: K, item: T) -> Option<T> {
        let previous = self.items.insert(key.clone(), item);
        if previous.is_none() {
            self.order.push_back(key);
        }
        previous
    }

    /// Get an item by key
    pub fn get(&self, key: &K) -> Option<&T> {
        self.items.get(key)
    }

    /// Get all items in insertion order
    pub fn get_ordered(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.order
            .iter()
            .filter_map(|key| self.items.get(key).cloned())
            .collect()
    }

    /// List all keys in insertion order
    pub fn list_keys(&self) -> Vec<K> {
        self.order.iter().cloned().collect()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    /// Remove an item by key
    pub fn remove(&mut self, key: &K) -> Option<T> {
        let item = self.items.remove(key)?;
        self.order.retain(|k| k != key);
        Some(item)
    }
}

impl<K, T> Default for Pile<K, T>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pile_insert_get() {
        let mut pile = Pile::new();
        pile.insert("a".to_string(), 1);

        assert!(pile.contains(&"a".to_string()));
        assert_eq!(pile.get(&"a".to_string()), Some(&1));
        assert_eq!(pile.list_keys(), vec!["a".to_string()]);
    }

    #[test]
    fn test_pile_ordering() {
        let mut pile = Pile::new();
        pile.insert("c", 3);
        pile.insert("a", 1);
        pile.insert("b", 2);

        assert_eq!(pile.list_keys(), vec!["c", "a", "b"]);
        assert_eq!(pile.get_ordered(), vec![3, 1, 2]);
    }

    #[test]
    fn test_pile_replace_keeps_position() {
        let mut pile = Pile::new();
        pile.insert("a", 1);
        pile.insert("b", 2);

        assert_eq!(pile.insert("a", 10), Some(1));
        assert_eq!(pile.list_keys(), vec!["a", "b"]);
        assert_eq!(pile.get_ordered(), vec![10, 2]);
    }

    #[test]
    fn test_pile_remove() {
        let mut pile = Pile::new();
        pile.insert("a", 1);
        pile.insert("b", 2);

        assert_eq!(pile.remove(&"a"), Some(1));
        assert_eq!(pile.remove(&"a"), None);
        assert_eq!(pile.list_keys(), vec!["b"]);
        assert_eq!(pile.get_ordered(), vec![2]);
    }
}
