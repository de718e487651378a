//! Request dispatch: choose between cache and network per intercepted request.
//!
//! | Request | Order | Fallbacks on network failure |
//! |---|---|---|
//! | non-GET, or worker not yet active | pass through | none |
//! | navigation | network, then cache | exact match, root document, offline page |
//! | static asset | cache, then network | root document, else no response |
//!
//! Fresh network responses are written back into the current generation by a
//! spawned task so the response is never held up by the cache write.

use std::sync::Arc;

use routine_core::{CacheStorage, Fetch, Request, Response};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use super::{ClientHost, OfflineWorker, WorkerState};

/// Partial content is never stored.
const PARTIAL_CONTENT: u16 = 206;

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    /// Exact match for the request.
    Cache,
    /// Cached root document standing in for the request.
    RootDocument,
    /// Synthesized offline page.
    OfflinePage,
    /// Static asset with no network, no match and no root document.
    Unresolved,
}

/// What the worker did with an intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted; the host performs the request itself.
    Passthrough,
    Respond {
        /// `None` only for [`ResponseSource::Unresolved`].
        response: Option<Response>,
        source: ResponseSource,
        /// Pending cache write of a fresh network response.
        write_back: Option<JoinHandle<()>>,
    },
}

impl FetchOutcome {
    fn served(response: Response, source: ResponseSource) -> Self {
        FetchOutcome::Respond { response: Some(response), source, write_back: None }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Respond { response, .. } => response.as_ref(),
            FetchOutcome::Passthrough => None,
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            FetchOutcome::Respond { source, .. } => Some(*source),
            FetchOutcome::Passthrough => None,
        }
    }

    /// Wait for the write-back, if any, to land.
    pub async fn settle(&mut self) {
        if let FetchOutcome::Respond { write_back, .. } = self
            && let Some(handle) = write_back.take()
            && let Err(e) = handle.await
        {
            tracing::warn!("cache write-back task failed: {}", e);
        }
    }
}

impl<S, F, H> OfflineWorker<S, F, H>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
    H: ClientHost + 'static,
{
    /// Answer an intercepted request.
    pub async fn handle_fetch(&self, request: Request) -> FetchOutcome {
        if !request.is_get() {
            return FetchOutcome::Passthrough;
        }

        if self.state().await != WorkerState::Activated {
            tracing::debug!("worker not active, passing through {}", request.url);
            return FetchOutcome::Passthrough;
        }

        if request.is_navigation() { self.network_first(request).await } else { self.cache_first(request).await }
    }

    async fn network_first(&self, request: Request) -> FetchOutcome {
        match self.network.fetch(&request).await {
            Ok(fresh) => {
                let write_back = self.write_back(request, fresh.clone());
                FetchOutcome::Respond { response: Some(fresh), source: ResponseSource::Network, write_back }
            }
            Err(e) => {
                tracing::debug!("navigation to {} failed ({}), falling back to cache", request.url, e);

                if let Some(cached) = self.lookup(&request).await {
                    return FetchOutcome::served(cached, ResponseSource::Cache);
                }
                if let Some(root) = self.lookup(&self.root_request()).await {
                    return FetchOutcome::served(root, ResponseSource::RootDocument);
                }
                FetchOutcome::served(Response::offline_page(&self.settings.offline_html), ResponseSource::OfflinePage)
            }
        }
    }

    async fn cache_first(&self, request: Request) -> FetchOutcome {
        if let Some(cached) = self.lookup(&request).await {
            tracing::debug!("cache hit for {}", request.url);
            return FetchOutcome::served(cached, ResponseSource::Cache);
        }

        match self.network.fetch(&request).await {
            Ok(fresh) => {
                let write_back = self.write_back(request, fresh.clone());
                FetchOutcome::Respond { response: Some(fresh), source: ResponseSource::Network, write_back }
            }
            Err(e) => {
                tracing::debug!("asset {} unavailable ({}), trying root document", request.url, e);

                match self.lookup(&self.root_request()).await {
                    Some(root) => FetchOutcome::served(root, ResponseSource::RootDocument),
                    None => FetchOutcome::Respond { response: None, source: ResponseSource::Unresolved, write_back: None },
                }
            }
        }
    }

    fn root_request(&self) -> Request {
        Request::get(self.settings.root_document.clone())
    }

    /// Match across all generations; storage errors count as a miss.
    async fn lookup(&self, request: &Request) -> Option<Response> {
        match self.storage.match_any(request).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("cache lookup for {} failed: {}", request.url, e);
                None
            }
        }
    }

    /// Store a copy of a fresh response without blocking the caller.
    fn write_back(&self, request: Request, response: Response) -> Option<JoinHandle<()>> {
        if response.status == PARTIAL_CONTENT {
            tracing::debug!("not caching partial response for {}", request.url);
            return None;
        }

        let storage = Arc::clone(&self.storage);
        let cache_name = self.settings.cache_name.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = storage.put(&cache_name, &request, &response).await {
                tracing::warn!("cache write-back for {} dropped: {}", request.url, e);
            }
        }))
    }
}
