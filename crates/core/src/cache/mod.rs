//! SQLite-backed cache storage for versioned response generations.
//!
//! This module provides a persistent cache using SQLite with async access via
//! tokio-rusqlite, shaped like a browser's cache storage:
//!
//! - Named stores, one per cache generation, kept in creation order
//! - Entries keyed by request method and URL (GET only)
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod storage;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use storage::CacheStorage;
