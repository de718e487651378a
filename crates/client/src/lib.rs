//! Client code for the routine offline cache worker.
//!
//! This crate provides the HTTP fetch pipeline that stands in for the
//! browser's network, and scope-relative URL resolution.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, UrlError, parse_scope, resolve};
