//! HTTP fetch pipeline used as the worker's network.
//!
//! ### Semantics
//! - Any HTTP response is a successful fetch, whatever its status; only
//!   transport failures (DNS, connect, TLS, timeout, oversized body) are errors.
//! - Method and request headers are forwarded as given.
//! - `CacheMode::NoCache` adds `Cache-Control: no-cache` and `Pragma: no-cache`
//!   so intermediate caches revalidate with the origin.
//!
//! ### Limits
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)
//! - Timeout: 20s (configurable)

pub mod url;

use async_trait::async_trait;
use reqwest::{Client, Method, header};
use routine_core::{AppConfig, CacheMode, Error, Fetch, Headers, Request, Response};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, parse_scope, resolve};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "routine-sw/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "routine-sw/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// HTTP fetch client backing the worker's network access.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Translate a worker request into a reqwest request without sending it.
    pub fn build_request(&self, request: &Request) -> Result<reqwest::Request, Error> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {}", request.method, e)))?;

        let mut builder = self.http.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if request.cache == CacheMode::NoCache {
            builder = builder
                .header(header::CACHE_CONTROL, "no-cache")
                .header(header::PRAGMA, "no-cache");
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        builder
            .build()
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", request.url, e)))
    }
}

/// Flatten a header map, combining repeated names into one value.
///
/// `set-cookie` values may themselves contain commas, so they are joined
/// with newlines instead.
fn collect_headers(map: &header::HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        let Ok(value) = value.to_str() else {
            continue;
        };
        let separator = if *name == header::SET_COOKIE { "\n" } else { ", " };
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(separator);
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    headers
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::FetchTimeout(err.to_string()) } else { Error::Network(err.to_string()) }
}

#[async_trait]
impl Fetch for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();
        let outgoing = self.build_request(request)?;

        let response = self.http.execute(outgoing).await.map_err(transport_error)?;

        let status = response.status();
        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().to_string();
        let headers = collect_headers(response.headers());

        let body = response.bytes().await.map_err(transport_error)?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", body.len(), self.config.max_bytes)));
        }

        tracing::debug!(
            "fetched {} {} -> {} ({}) in {}ms ({} bytes)",
            request.method,
            request.url,
            final_url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Response { url: final_url, status: status.as_u16(), headers, body })
    }
}
