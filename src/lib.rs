//! # Chain Map
//!
//! A Rust implementation of a string-keyed hash table with separate chaining.
//!
//! Every bucket of the table is a singly linked list (`Chain`) of key-value pairs. Keys are
//! hashed with a small additive rolling hash over their UTF-16 code units, and the bucket array
//! doubles whenever the ratio of entries to buckets exceeds the load factor threshold (0.75 by
//! default), rehashing every entry against the new length.
//!
//! ## Basic Usage
//!
//! ```rust
//! use chainmap::{ChainMap, MapError};
//!
//! # fn main() -> Result<(), MapError> {
//! // Create a new map with 16 buckets
//! let mut map = ChainMap::new();
//!
//! // Insert values
//! map.set("apple", "red")?;
//! map.set("banana", "yellow")?;
//!
//! // Retrieve values
//! assert_eq!(map.get("apple")?, &"red");
//!
//! // Update values
//! map.set("apple", "green")?;
//! assert_eq!(map.get("apple")?, &"green");
//! assert_eq!(map.len(), 2);
//!
//! // Remove values
//! assert!(map.remove("apple"));
//! assert!(!map.has("apple"));
//! assert!(map.get("apple").is_err_and(|err| err.is_not_found()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Growth
//!
//! ```rust
//! use chainmap::{ChainMap, MapError};
//!
//! # fn main() -> Result<(), MapError> {
//! let mut map = ChainMap::with_capacity_and_load_factor(4, 0.75);
//!
//! for (i, key) in ["a", "b", "c"].into_iter().enumerate() {
//!     map.set(key, i)?;
//! }
//! // 3 / 4 is not above the threshold yet
//! assert_eq!(map.capacity(), 4);
//!
//! map.set("d", 3)?;
//! assert_eq!(map.capacity(), 8);
//! assert_eq!(map.keys().len(), 4);
//! # Ok(())
//! # }
//! ```

/// Module implementing the linked-list buckets
mod chain;
/// Module implementing the hash table over the buckets
mod chain_map;
/// Module defining the error type shared by the map and its buckets
mod error;
/// Utility functions and traits for the hash map
mod utils;

pub use chain::{Chain, IntoIter as ChainIntoIter, Iter as ChainIter};
pub use chain_map::{ChainMap, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, Iter, hash};
pub use error::MapError;
pub use utils::{ChainMapExtensions, from_pairs, try_extend};
