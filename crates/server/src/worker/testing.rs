//! In-memory collaborators for worker tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use routine_core::{AppConfig, CacheDb, CacheStorage, Error, Fetch, Request, Response};
use tokio::sync::{Barrier, Notify};
use url::Url;

use super::{EffectLog, OfflineWorker, WorkerSettings};

pub(crate) type TestWorker = OfflineWorker<CacheDb, ScriptedFetch, EffectLog>;

/// Network double answering from a fixed route table.
///
/// Unrouted URLs fail as if the network were down. Every request is recorded.
#[derive(Debug, Default)]
pub(crate) struct ScriptedFetch {
    routes: Mutex<HashMap<String, Response>>,
    requests: Mutex<Vec<Request>>,
    rendezvous: Option<Barrier>,
}

impl ScriptedFetch {
    /// No routes: every fetch fails.
    pub(crate) fn offline() -> Self {
        Self::default()
    }

    /// Hold every fetch until `n` fetches are in flight at once.
    pub(crate) fn rendezvous(mut self, n: usize) -> Self {
        self.rendezvous = Some(Barrier::new(n));
        self
    }

    pub(crate) fn route(self, url: &str, response: Response) -> Self {
        self.set_route(url, response);
        self
    }

    pub(crate) fn set_route(&self, url: &str, response: Response) {
        self.routes.lock().unwrap().insert(url.to_string(), response);
    }

    /// Drop every route.
    pub(crate) fn go_offline(&self) {
        self.routes.lock().unwrap().clear();
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for ScriptedFetch {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
        let routed = self.routes.lock().unwrap().get(request.url.as_str()).cloned();
        routed.ok_or_else(|| Error::Network(format!("{}: connection refused", request.url)))
    }
}

/// `CacheDb` with hooks: writes to one URL wait for [`HookedStorage::release`],
/// and deletes can be made to fail.
pub(crate) struct HookedStorage {
    inner: CacheDb,
    held_url: Option<String>,
    put_started: Notify,
    put_released: Notify,
    fail_deletes: bool,
}

impl HookedStorage {
    pub(crate) async fn new() -> Self {
        Self {
            inner: CacheDb::open_in_memory().await.unwrap(),
            held_url: None,
            put_started: Notify::new(),
            put_released: Notify::new(),
            fail_deletes: false,
        }
    }

    pub(crate) fn hold_puts_for(mut self, url: &str) -> Self {
        self.held_url = Some(url.to_string());
        self
    }

    pub(crate) fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// Resolves once a held write has started.
    pub(crate) async fn put_started(&self) {
        self.put_started.notified().await;
    }

    pub(crate) fn release(&self) {
        self.put_released.notify_one();
    }
}

#[async_trait]
impl CacheStorage for HookedStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.inner.open(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.inner.keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        if self.fail_deletes {
            return Err(Error::InvalidState(format!("delete {name}: storage unavailable")));
        }
        self.inner.delete(name).await
    }

    async fn put(&self, name: &str, request: &Request, response: &Response) -> Result<(), Error> {
        if self.held_url.as_deref() == Some(request.url.as_str()) {
            self.put_started.notify_one();
            self.put_released.notified().await;
        }
        self.inner.put(name, request, response).await
    }

    async fn match_in(&self, name: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.inner.match_in(name, request).await
    }

    async fn match_any(&self, request: &Request) -> Result<Option<Response>, Error> {
        self.inner.match_any(request).await
    }

    async fn entries(&self, name: &str) -> Result<Vec<String>, Error> {
        self.inner.entries(name).await
    }
}

/// Default settings under a given generation name.
pub(crate) fn settings(cache_name: &str) -> WorkerSettings {
    let config = AppConfig { cache_name: cache_name.to_string(), ..Default::default() };
    WorkerSettings::from_config(&config).unwrap()
}

pub(crate) fn worker_on<S>(storage: Arc<S>, settings: WorkerSettings, fetch: ScriptedFetch) -> OfflineWorker<S, ScriptedFetch, EffectLog>
where
    S: CacheStorage + 'static,
{
    OfflineWorker::new(settings, storage, Arc::new(fetch), Arc::new(EffectLog::new()))
}

pub(crate) async fn worker_with(settings: WorkerSettings, fetch: ScriptedFetch) -> TestWorker {
    let storage = Arc::new(CacheDb::open_in_memory().await.unwrap());
    worker_on(storage, settings, fetch)
}

/// A `v1` worker, installed and activated, with its host log drained.
pub(crate) async fn activated(fetch: ScriptedFetch) -> TestWorker {
    let worker = worker_with(settings("v1"), fetch).await;
    worker.install().await.unwrap();
    worker.activate().await.unwrap();
    worker.host().drain().await;
    worker
}

/// An installed and activated `v1` worker over hooked storage.
pub(crate) async fn activated_on(
    storage: Arc<HookedStorage>, fetch: ScriptedFetch,
) -> OfflineWorker<HookedStorage, ScriptedFetch, EffectLog> {
    let worker = worker_on(storage, settings("v1"), fetch);
    worker.install().await.unwrap();
    worker.activate().await.unwrap();
    worker.host().drain().await;
    worker
}

pub(crate) fn get(url: &str) -> Request {
    Request::get(Url::parse(url).unwrap())
}

pub(crate) fn html(body: &str) -> Response {
    Response::new("", 200, body.to_string()).with_header("content-type", "text/html")
}
