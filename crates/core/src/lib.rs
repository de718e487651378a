//! Core types and shared functionality for the routine offline cache worker.
//!
//! This crate provides:
//! - Cache storage with SQLite backend
//! - Request/response model and the network seam
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{CacheDb, CacheStorage};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{CacheMode, Fetch, Headers, Request, RequestMode, Response};
