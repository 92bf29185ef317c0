use std::{fmt, iter::FusedIterator, mem};

use crate::MapError;

/// A key-value pair owning the next pair of its chain
#[derive(Debug)]
struct Node<V> {
    /// The key of the entry
    key: String,
    /// The value associated with the key
    value: V,
    /// The following node of the chain, if any
    next: Option<Box<Node<V>>>,
}

impl<V> Node<V> {
    /// Creates a detached node
    fn new(key: String, value: V) -> Self {
        Self { key, value, next: None }
    }
}

/// A singly linked list of entries sharing one bucket of a `ChainMap`.
///
/// Entries are kept in insertion order: `add` appends at the tail. The chain itself does not
/// enforce key uniqueness, callers check `has_key` before calling `add`.
pub struct Chain<V> {
    /// The first node of the chain
    head: Option<Box<Node<V>>>,
    /// Number of nodes reachable from `head`
    count: usize,
}

impl<V> Default for Chain<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for Chain<V> {
    fn clone(&self) -> Self {
        // Build through a tail cursor so long chains don't recurse through `Box` clones
        let mut chain = Self::new();
        let mut tail = &mut chain.head;
        for (key, value) in self {
            let node = tail.insert(Box::new(Node::new(key.to_owned(), value.clone())));
            tail = &mut node.next;
        }
        chain.count = self.count;
        chain
    }
}

impl<V: fmt::Debug> fmt::Debug for Chain<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Drop for Chain<V> {
    fn drop(&mut self) {
        // Unlink one node at a time so long chains don't recurse through `Box` drops
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
    }
}

impl<V> Chain<V> {
    /// Creates an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self { head: None, count: 0 }
    }

    /// Returns the number of entries in the chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the chain holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Appends an entry at the tail of the chain without checking for an existing key
    pub fn add(&mut self, key: String, value: V) {
        let mut cursor = &mut self.head;
        while let Some(node) = cursor {
            cursor = &mut node.next;
        }
        *cursor = Some(Box::new(Node::new(key, value)));
        self.count = self.count.saturating_add(1);
    }

    /// Replaces the value stored under `key`, returning the previous one.
    ///
    /// Returns `None` and drops `value` if the key is absent.
    pub fn change_value(&mut self, key: &str, value: V) -> Option<V> {
        self.node_mut(key).map(|node| mem::replace(&mut node.value, value))
    }

    /// Returns the value stored under `key`
    ///
    /// # Errors
    ///
    /// `MapError::EmptyChain` if the chain has no entries, `MapError::KeyNotFound` if none of
    /// them matches `key`.
    pub fn find_value(&self, key: &str) -> Result<&V, MapError> {
        self.node(key).map(|node| &node.value).ok_or_else(|| not_found(key, self.is_empty()))
    }

    /// Returns a mutable reference to the value stored under `key`
    ///
    /// # Errors
    ///
    /// Same as [`Chain::find_value`].
    pub fn find_value_mut(&mut self, key: &str) -> Result<&mut V, MapError> {
        let empty = self.is_empty();
        self.node_mut(key).map(|node| &mut node.value).ok_or_else(|| not_found(key, empty))
    }

    /// Returns true if an entry with `key` is in the chain
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.node(key).is_some()
    }

    /// Unlinks the first entry matching `key` and returns its value
    ///
    /// # Errors
    ///
    /// Same as [`Chain::find_value`]. The chain is left untouched on error.
    pub fn remove_node(&mut self, key: &str) -> Result<V, MapError> {
        if self.is_empty() {
            return Err(not_found(key, true));
        }

        let mut cursor = &mut self.head;
        while cursor.as_ref().is_some_and(|node| node.key != key) {
            if let Some(node) = cursor {
                cursor = &mut node.next;
            }
        }

        let mut removed = cursor.take().ok_or_else(|| not_found(key, false))?;
        *cursor = removed.next.take();
        self.count = self.count.saturating_sub(1);
        Ok(removed.value)
    }

    /// Returns the keys in chain order
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Returns the values in chain order
    #[must_use]
    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, value)| value).collect()
    }

    /// Returns every entry of the chain as `(key, value)` pairs in chain order
    #[must_use]
    pub fn key_values(&self) -> Vec<(&str, &V)> {
        self.iter().collect()
    }

    /// Returns an iterator over the entries in chain order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter { next: self.head.as_deref(), remaining: self.count }
    }

    /// Walks the chain looking for `key`
    fn node(&self, key: &str) -> Option<&Node<V>> {
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            if node.key == key {
                return Some(node);
            }
            cursor = node.next.as_deref();
        }
        None
    }

    /// Walks the chain looking for `key`, mutably
    fn node_mut(&mut self, key: &str) -> Option<&mut Node<V>> {
        let mut cursor = self.head.as_deref_mut();
        while let Some(node) = cursor {
            if node.key == key {
                return Some(node);
            }
            cursor = node.next.as_deref_mut();
        }
        None
    }
}

/// Builds the lookup error matching the state of the chain
fn not_found(key: &str, empty: bool) -> MapError {
    if empty {
        MapError::EmptyChain { key: key.to_owned() }
    } else {
        MapError::KeyNotFound { key: key.to_owned() }
    }
}

/// Borrowing iterator over the entries of a chain
#[derive(Debug)]
pub struct Iter<'a, V> {
    /// The node to yield next
    next: Option<&'a Node<V>>,
    /// Number of nodes not yet yielded
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            self.remaining = self.remaining.saturating_sub(1);
            (node.key.as_str(), &node.value)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a Chain<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over the entries of a chain
#[derive(Debug)]
pub struct IntoIter<V> {
    /// The node to yield next
    next: Option<Box<Node<V>>>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (String, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.next.take().map(|node| {
            let Node { key, value, next } = *node;
            self.next = next;
            (key, value)
        })
    }
}

impl<V> FusedIterator for IntoIter<V> {}

impl<V> Drop for IntoIter<V> {
    fn drop(&mut self) {
        for _ in self.by_ref() {}
    }
}

impl<V> IntoIterator for Chain<V> {
    type Item = (String, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(mut self) -> Self::IntoIter {
        IntoIter { next: self.head.take() }
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn chain_of(pairs: &[(&str, i32)]) -> Chain<i32> {
        let mut chain = Chain::new();
        for &(key, value) in pairs {
            chain.add(key.to_string(), value);
        }
        chain
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let chain = chain_of(&[("a", 1), ("b", 2), ("c", 3)]);

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.keys(), vec!["a", "b", "c"]);
        assert_eq!(chain.values(), vec![&1, &2, &3]);
        assert_eq!(chain.key_values(), vec![("a", &1), ("b", &2), ("c", &3)]);
    }

    #[test]
    fn test_change_value() {
        let mut chain = chain_of(&[("a", 1), ("b", 2)]);

        assert_eq!(chain.change_value("b", 20), Some(2));
        assert_eq!(chain.change_value("z", 99), None);
        assert_eq!(chain.key_values(), vec![("a", &1), ("b", &20)]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_find_value() -> Result<(), MapError> {
        let mut chain = chain_of(&[("a", 1), ("b", 2)]);

        assert_eq!(chain.find_value("b")?, &2);
        *chain.find_value_mut("a")? += 10;
        assert_eq!(chain.find_value("a")?, &11);
        assert_eq!(chain.find_value("z"), Err(MapError::KeyNotFound { key: "z".to_string() }));
        Ok(())
    }

    #[test]
    fn test_find_value_on_empty_chain() {
        let mut chain: Chain<i32> = Chain::new();

        assert_eq!(chain.find_value("a"), Err(MapError::EmptyChain { key: "a".to_string() }));
        assert!(chain.find_value_mut("a").is_err());
        assert!(!chain.has_key("a"));
    }

    #[test]
    fn test_has_key() {
        let chain = chain_of(&[("a", 1), ("b", 2)]);

        assert!(chain.has_key("a"));
        assert!(chain.has_key("b"));
        assert!(!chain.has_key("c"));
    }

    #[test]
    fn test_remove_head_middle_tail() -> Result<(), MapError> {
        let mut chain = chain_of(&[("a", 1), ("b", 2), ("c", 3), ("d", 4)]);

        assert_eq!(chain.remove_node("a")?, 1);
        assert_eq!(chain.keys(), vec!["b", "c", "d"]);

        assert_eq!(chain.remove_node("c")?, 3);
        assert_eq!(chain.keys(), vec!["b", "d"]);

        assert_eq!(chain.remove_node("d")?, 4);
        assert_eq!(chain.keys(), vec!["b"]);
        assert_eq!(chain.len(), 1);

        assert_eq!(chain.remove_node("b")?, 2);
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        Ok(())
    }

    #[test]
    fn test_remove_missing_leaves_chain_intact() {
        let mut chain = chain_of(&[("a", 1), ("b", 2)]);

        assert_eq!(chain.remove_node("z"), Err(MapError::KeyNotFound { key: "z".to_string() }));
        assert_eq!(chain.key_values(), vec![("a", &1), ("b", &2)]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_remove_on_empty_chain() {
        let mut chain: Chain<i32> = Chain::new();

        assert_eq!(chain.remove_node("a"), Err(MapError::EmptyChain { key: "a".to_string() }));
    }

    #[test]
    fn test_add_after_remove_appends_at_tail() -> Result<(), MapError> {
        let mut chain = chain_of(&[("a", 1), ("b", 2)]);
        chain.remove_node("b")?;
        chain.add("c".to_string(), 3);

        assert_eq!(chain.keys(), vec!["a", "c"]);
        assert_eq!(chain.len(), 2);
        Ok(())
    }

    #[test]
    fn test_iter_size_hint() {
        let chain = chain_of(&[("a", 1), ("b", 2), ("c", 3)]);
        let mut iter = chain.iter();

        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next(), Some(("a", &1)));
        assert_eq!(iter.len(), 2);
        assert_eq!((&chain).into_iter().count(), 3);
    }

    #[test]
    fn test_into_iter_moves_entries() {
        let chain = chain_of(&[("a", 1), ("b", 2)]);
        let entries: Vec<(String, i32)> = chain.into_iter().collect();

        assert_eq!(entries, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn test_long_chain_drops() {
        let mut chain = Chain::new();
        for i in 0..20_000 {
            chain.add(String::new(), i);
        }
        assert_eq!(chain.len(), 20_000);
        drop(chain);
    }

    #[test]
    fn test_long_chain_clones() {
        let mut chain = Chain::new();
        for i in 0..20_000 {
            chain.add(String::new(), i);
        }

        // A small stack makes a per-node recursion overflow well before the end of the chain
        let cloned = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || {
                let cloned = chain.clone();
                cloned.iter().zip(chain.iter()).all(|(left, right)| left == right) &&
                    cloned.len() == chain.len()
            })
            .map(|handle| handle.join());

        assert!(matches!(cloned, Ok(Ok(true))));
    }

    #[test]
    fn test_clone_is_independent() -> Result<(), MapError> {
        let mut chain = chain_of(&[("a", 1), ("b", 2), ("c", 3)]);
        let cloned = chain.clone();
        chain.remove_node("b")?;
        *chain.find_value_mut("a")? = 10;

        assert_eq!(cloned.key_values(), vec![("a", &1), ("b", &2), ("c", &3)]);
        assert_eq!(cloned.len(), 3);
        assert_eq!(chain.key_values(), vec![("a", &10), ("c", &3)]);
        Ok(())
    }

    #[test]
    fn test_debug() {
        let chain = chain_of(&[("a", 1)]);
        assert_eq!(format!("{chain:?}"), r#"{"a": 1}"#);
    }
}
