use std::{iter::FusedIterator, mem, slice};

use crate::{Chain, MapError, chain};

/// Number of buckets a map starts with unless told otherwise
pub const DEFAULT_CAPACITY: usize = 16;

/// Ratio of entries to buckets above which the bucket array is doubled
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Smallest accepted load factor threshold, lower values are raised to it
const MIN_LOAD_FACTOR: f64 = 0.1;

/// Multiplier applied to every code unit of a key
const PRIME: usize = 31;

/// Hashes `key` to a bucket index in `0..table_size`.
///
/// Each UTF-16 code unit of the key is multiplied by 31 and added to the running code, which is
/// reduced modulo `table_size` after every step so it never leaves the bucket range. The result
/// is deterministic across runs. An empty table maps every key to 0.
#[must_use]
pub fn hash(key: &str, table_size: usize) -> usize {
    key.encode_utf16().fold(0, |code: usize, unit| {
        code.wrapping_add(usize::from(unit).wrapping_mul(PRIME)).checked_rem(table_size).unwrap_or(0)
    })
}

/// A hash map from strings to `V` resolving collisions with linked-list chains.
///
/// Buckets are allocated lazily: a slot holds no chain until a key is first stored in it. When
/// the number of entries per bucket exceeds the load factor threshold the bucket array is
/// doubled and every entry is rehashed against the new length.
///
/// Note: This implementation is not thread-safe.
#[derive(Debug, Clone)]
pub struct ChainMap<V> {
    /// The bucket array, `None` for slots no key has hashed to yet
    buckets: Vec<Option<Chain<V>>>,
    /// Current number of entries in the map
    size: usize,
    /// Ratio of entries to buckets that triggers a resize when exceeded
    load_factor_threshold: f64,
}

impl<V> Default for ChainMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ChainMap<V> {
    /// Creates a new `ChainMap` with 16 buckets and a 0.75 load factor threshold
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a new `ChainMap` with the specified number of buckets (at least 1)
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_load_factor(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Creates a new `ChainMap` with the specified number of buckets and load factor threshold.
    ///
    /// A threshold that is not a finite positive number is replaced by the default 0.75, and a
    /// threshold below 0.1 is raised to 0.1.
    #[must_use]
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f64) -> Self {
        Self {
            buckets: empty_buckets(capacity.max(1)),
            size: 0,
            load_factor_threshold: sanitize_load_factor(load_factor),
        }
    }

    /// Provide a way to configure the load factor threshold.
    ///
    /// Takes effect on the next insertion of a new key.
    pub fn set_load_factor(&mut self, load_factor: f64) {
        self.load_factor_threshold = sanitize_load_factor(load_factor);
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// A new key grows the map by one entry and may trigger a resize; an existing key only has
    /// its value swapped.
    ///
    /// # Errors
    ///
    /// `MapError::OutOfBounds` if the key hashes outside the bucket array. The map is unchanged.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Result<Option<V>, MapError> {
        let previous = place(&mut self.buckets, key.into(), value)?;

        if previous.is_none() {
            self.size = self.size.saturating_add(1);
            // One doubling is enough unless the table holds fewer than 1 / threshold buckets
            while self.load_factor() > self.load_factor_threshold {
                self.resize()?;
            }
        }

        Ok(previous)
    }

    /// Retrieve the value stored under `key`
    ///
    /// # Errors
    ///
    /// `MapError::EmptyChain` if the key's bucket holds nothing, `MapError::KeyNotFound` if the
    /// bucket holds other keys only.
    pub fn get(&self, key: &str) -> Result<&V, MapError> {
        self.chain(key)?.ok_or_else(|| empty_bucket(key))?.find_value(key)
    }

    /// Get a mutable reference to the value stored under `key`
    ///
    /// # Errors
    ///
    /// Same as [`ChainMap::get`].
    pub fn get_mut(&mut self, key: &str) -> Result<&mut V, MapError> {
        self.chain_mut(key)?.ok_or_else(|| empty_bucket(key))?.find_value_mut(key)
    }

    /// Returns true if the map holds an entry for `key`
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.chain(key).ok().flatten().is_some_and(|chain| chain.has_key(key))
    }

    /// Removes the entry for `key`, returning whether there was one
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self
            .chain_mut(key)
            .ok()
            .flatten()
            .is_some_and(|chain| chain.remove_node(key).is_ok());

        if removed {
            self.size = self.size.saturating_sub(1);
        }

        removed
    }

    /// Returns the number of entries, counted over every chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().flatten().map(Chain::len).sum()
    }

    /// Returns true if the map holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().flatten().all(Chain::is_empty)
    }

    /// Clears the map, leaving an empty chain in every bucket.
    ///
    /// The bucket count is kept.
    pub fn clear(&mut self) {
        for slot in &mut self.buckets {
            *slot = Some(Chain::new());
        }
        self.size = 0;
    }

    /// Returns the keys in bucket order, then chain order within a bucket
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Returns the values in the same order as [`ChainMap::keys`]
    #[must_use]
    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, value)| value).collect()
    }

    /// Returns the `(key, value)` pairs in the same order as [`ChainMap::keys`]
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, &V)> {
        self.iter().collect()
    }

    /// Returns an iterator over the key-value pairs
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter { buckets: self.buckets.iter(), current: None, remaining: self.size }
    }

    /// Returns the number of buckets in the map
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the current ratio of entries to buckets
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.buckets.len() as f64
    }

    /// Returns the ratio above which the next new key doubles the bucket array
    #[must_use]
    pub fn load_factor_threshold(&self) -> f64 {
        self.load_factor_threshold
    }

    /// Returns the chain length of every bucket, 0 for unset slots
    #[must_use]
    pub fn bucket_lengths(&self) -> Vec<usize> {
        self.buckets.iter().map(|slot| slot.as_ref().map_or(0, Chain::len)).collect()
    }

    /// Returns the chain of every allocated bucket in bucket order
    pub(crate) fn chains(&self) -> impl Iterator<Item = &Chain<V>> {
        self.buckets.iter().flatten()
    }

    /// Computes the bucket index of `key` against the current bucket array
    fn bucket_index(&self, key: &str) -> Result<usize, MapError> {
        let len = self.buckets.len();
        let index = hash(key, len);
        if index < len { Ok(index) } else { Err(MapError::OutOfBounds { index, len }) }
    }

    /// Returns the chain `key` hashes to, if its bucket has been allocated
    fn chain(&self, key: &str) -> Result<Option<&Chain<V>>, MapError> {
        let index = self.bucket_index(key)?;
        Ok(self.buckets.get(index).and_then(Option::as_ref))
    }

    /// Returns the chain `key` hashes to mutably, if its bucket has been allocated
    fn chain_mut(&mut self, key: &str) -> Result<Option<&mut Chain<V>>, MapError> {
        let index = self.bucket_index(key)?;
        Ok(self.buckets.get_mut(index).and_then(Option::as_mut))
    }

    /// Doubles the bucket array and rehashes every entry against the new length.
    ///
    /// The new array replaces the old one only once every entry has been moved. `hash` reduces
    /// modulo the new length, so `place` cannot miss a non-empty array.
    fn resize(&mut self) -> Result<(), MapError> {
        let len = self.buckets.len().saturating_mul(2);

        let mut buckets = empty_buckets(len);
        for (key, value) in mem::take(&mut self.buckets).into_iter().flatten().flatten() {
            place(&mut buckets, key, value)?;
        }

        self.buckets = buckets;
        Ok(())
    }
}

/// Allocates `len` unset bucket slots
fn empty_buckets<V>(len: usize) -> Vec<Option<Chain<V>>> {
    std::iter::repeat_with(|| None).take(len).collect()
}

/// Stores an entry in `buckets`: allocate the chain if unset, update an existing key, or
/// append a new node.
fn place<V>(
    buckets: &mut [Option<Chain<V>>],
    key: String,
    value: V,
) -> Result<Option<V>, MapError> {
    let len = buckets.len();
    let index = hash(&key, len);
    let chain = buckets
        .get_mut(index)
        .ok_or(MapError::OutOfBounds { index, len })?
        .get_or_insert_with(Chain::new);

    if chain.has_key(&key) {
        return Ok(chain.change_value(&key, value));
    }

    chain.add(key, value);
    Ok(None)
}

/// Error for a lookup landing on an unset bucket
fn empty_bucket(key: &str) -> MapError {
    MapError::EmptyChain { key: key.to_owned() }
}

/// Falls back to the default for thresholds that cannot bound the table, and keeps tiny ones
/// from blowing the bucket array up on the first insertion
fn sanitize_load_factor(load_factor: f64) -> f64 {
    if load_factor.is_finite() && load_factor > 0.0 {
        load_factor.max(MIN_LOAD_FACTOR)
    } else {
        DEFAULT_LOAD_FACTOR
    }
}

/// Iterator over the key-value pairs of the map
#[derive(Debug)]
pub struct Iter<'a, V> {
    /// Bucket slots not yet visited
    buckets: slice::Iter<'a, Option<Chain<V>>>,
    /// Entries left in the bucket being visited
    current: Option<chain::Iter<'a, V>>,
    /// Number of entries not yet yielded
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.as_mut().and_then(Iterator::next) {
                self.remaining = self.remaining.saturating_sub(1);
                return Some(entry);
            }
            self.current = self.buckets.next()?.as_ref().map(Chain::iter);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a ChainMap<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
