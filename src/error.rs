//! Errors surfaced by `ChainMap` and its bucket chains

use thiserror::Error;

/// Failure modes of the map operations.
///
/// All of them are caller-precondition violations: nothing is mutated before one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The hash produced a bucket index outside the bucket array
    #[error("bucket index {index} is out of bounds for a table of {len} buckets")]
    OutOfBounds {
        /// The computed bucket index
        index: usize,
        /// Number of buckets in the table at the time of the lookup
        len: usize,
    },
    /// The key is absent from a non-empty chain
    #[error("key `{key}` not found")]
    KeyNotFound {
        /// The key that was looked up
        key: String,
    },
    /// The chain the key hashes to holds no entries
    #[error("bucket for key `{key}` is empty")]
    EmptyChain {
        /// The key that was looked up
        key: String,
    },
}

impl MapError {
    /// Returns true if the error means the key is not stored in the map
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. } | Self::EmptyChain { .. })
    }
}
