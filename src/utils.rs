//! Utility functions and traits for `ChainMap`

use crate::{ChainMap, MapError};

/// Extension trait for `ChainMap` that provides owned and per-bucket views of its entries
pub trait ChainMapExtensions<V> {
    /// Returns the keys of the map as owned strings
    fn owned_keys(&self) -> Vec<String>;

    /// Returns the values of the map as a Vec
    fn owned_values(&self) -> Vec<V>
    where
        V: Clone;

    /// Returns the entries grouped by bucket, skipping empty buckets.
    ///
    /// Each inner Vec holds the pairs of one chain in chain order.
    fn bucket_entries(&self) -> Vec<Vec<(&str, &V)>>;
}

impl<V> ChainMapExtensions<V> for ChainMap<V> {
    fn owned_keys(&self) -> Vec<String> {
        self.iter().map(|(key, _)| key.to_owned()).collect()
    }

    fn owned_values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, value)| value.clone()).collect()
    }

    fn bucket_entries(&self) -> Vec<Vec<(&str, &V)>> {
        self.chains().filter(|chain| !chain.is_empty()).map(|chain| chain.key_values()).collect()
    }
}

/// Creates a `ChainMap` from an iterator of key-value pairs
///
/// # Errors
///
/// Propagates the first error returned by [`ChainMap::set`].
pub fn from_pairs<K, V, I>(iter: I) -> Result<ChainMap<V>, MapError>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut map = ChainMap::new();
    try_extend(&mut map, iter)?;
    Ok(map)
}

/// Inserts every pair of `iter` into `map`, later pairs overwriting earlier ones
///
/// # Errors
///
/// Propagates the first error returned by [`ChainMap::set`]; pairs before it stay inserted.
pub fn try_extend<K, V, I>(map: &mut ChainMap<V>, iter: I) -> Result<(), MapError>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    for (key, value) in iter {
        map.set(key, value)?;
    }
    Ok(())
}
