//! Cache inspection tools.
//!
//! Read-only views of the cache generations the worker manages.

pub mod entries;
pub mod keys;

pub use entries::{CacheEntriesParams, cache_entries_impl};
pub use keys::cache_keys_impl;
