//! Request and response model shared by the cache, the fetch client and the
//! worker policy.
//!
//! Header names are stored lower-cased so lookups are case-insensitive.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

/// Lower-cased header name to value.
///
/// Repeated headers are combined into one value: `, `-separated, except
/// `set-cookie` whose values are newline-separated.
pub type Headers = BTreeMap<String, String>;

/// How the request was initiated by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level document navigation.
    Navigate,
    SameOrigin,
    #[default]
    NoCors,
    Cors,
}

/// Whether intermediate HTTP caches may answer the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    #[default]
    Default,
    /// Revalidate with the origin; used for precaching.
    NoCache,
}

/// An intercepted or outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
    pub headers: Headers,
    pub cache: CacheMode,
    /// Request payload; always `None` for GET.
    pub body: Option<Bytes>,
}

impl Request {
    /// A plain GET for `url`.
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".into(),
            url,
            mode: RequestMode::default(),
            headers: Headers::new(),
            cache: CacheMode::Default,
            body: None,
        }
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cache(mut self, cache: CacheMode) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// True for top-level document loads: navigation mode, or an Accept
    /// header asking for HTML.
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate || self.header("accept").is_some_and(|accept| accept.contains("text/html"))
    }
}

/// A response from the network, the cache, or synthesized by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: String,
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self { url: url.into(), status, headers: Headers::new(), body: body.into() }
    }

    /// The minimal page returned when a navigation has neither network nor cache.
    pub fn offline_page(html: &str) -> Self {
        Self::new("", 200, html.to_string()).with_header("content-type", "text/html; charset=utf-8")
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Status in the 200-299 range.
    pub fn is_ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// Network access as seen by the worker.
///
/// Implementations return `Ok` for every HTTP response regardless of status;
/// `Err` means the network could not produce a response at all.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}
