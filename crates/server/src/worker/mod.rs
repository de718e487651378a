//! Offline cache worker.
//!
//! Keeps one versioned cache generation live for a static site:
//!
//! - **install**: precache the shell into the current generation, then skip waiting
//! - **activate**: delete every other generation and claim open pages
//! - **fetch**: network-first for navigations, cache-first for static assets,
//!   non-GET requests pass through
//! - **push / notificationclick / sync / periodicsync**: auxiliary hooks
//!
//! The worker is generic over its collaborators so the policy runs the same
//! against SQLite and reqwest in production and against in-memory doubles in
//! tests.

pub mod activate;
pub mod fetch;
pub mod host;
pub mod install;
pub mod notify;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::sync::Arc;

use routine_client::{FetchClient, resolve};
use routine_core::{AppConfig, CacheDb, CacheStorage, Error, Fetch, Request};
use tokio::sync::RwLock;
use url::Url;

pub use activate::ActivateReport;
pub use fetch::{FetchOutcome, ResponseSource};
pub use host::{ClientHost, EffectLog, HostEffect, Notification};
pub use install::InstallReport;

/// The production worker: SQLite storage, reqwest network, recorded host effects.
pub type SiteWorker = OfflineWorker<CacheDb, FetchClient, EffectLog>;

/// Resolved, validated worker settings.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Name of the current cache generation.
    pub cache_name: String,
    pub scope: Url,
    /// Precache manifest, resolved against `scope`, in manifest order.
    pub precache: Vec<Url>,
    /// Fallback document for requests with no cached match of their own.
    pub root_document: Url,
    /// Page opened on notification click.
    pub open_url: Url,
    pub offline_html: String,
    pub notification_icon: String,
    pub notification_badge: String,
    pub push_title: String,
    pub push_body: String,
}

impl WorkerSettings {
    /// Resolve every configured URL against the scope.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let scope = routine_client::parse_scope(&config.scope_url)
            .map_err(|e| Error::InvalidUrl(format!("scope_url: {e}")))?;
        let resolve_in_scope =
            |field: &str, input: &str| resolve(&scope, input).map_err(|e| Error::InvalidUrl(format!("{field}: {input}: {e}")));

        let precache = config
            .precache
            .iter()
            .map(|entry| resolve_in_scope("precache", entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            cache_name: config.cache_name.clone(),
            root_document: resolve_in_scope("root_document", &config.root_document)?,
            open_url: resolve_in_scope("open_url", &config.open_url)?,
            precache,
            offline_html: config.offline_html.clone(),
            notification_icon: config.notification_icon.clone(),
            notification_badge: config.notification_badge.clone(),
            push_title: config.push_title.clone(),
            push_body: config.push_body.clone(),
            scope,
        })
    }

    /// Resolve a request URL against the scope.
    pub fn resolve(&self, input: &str) -> Result<Url, Error> {
        resolve(&self.scope, input).map_err(|e| Error::InvalidUrl(format!("{input}: {e}")))
    }
}

/// Worker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
        };
        f.write_str(name)
    }
}

/// Events delivered by the host.
#[derive(Debug, Clone)]
pub enum Event {
    Install,
    Activate,
    Fetch(Request),
    Sync { tag: String },
    PeriodicSync { tag: String },
    Push { data: Option<Vec<u8>> },
    NotificationClick { tag: Option<String> },
}

/// Completion of a dispatched event.
#[derive(Debug)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivateReport),
    Fetch(FetchOutcome),
    Notified(Notification),
    Handled,
}

/// Offline cache worker over a cache store, a network and a host.
pub struct OfflineWorker<S, F, H> {
    settings: WorkerSettings,
    storage: Arc<S>,
    network: Arc<F>,
    host: Arc<H>,
    state: RwLock<WorkerState>,
}

impl<S, F, H> OfflineWorker<S, F, H>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
    H: ClientHost + 'static,
{
    pub fn new(settings: WorkerSettings, storage: Arc<S>, network: Arc<F>, host: Arc<H>) -> Self {
        Self { settings, storage, network, host, state: RwLock::new(WorkerState::Parsed) }
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn network(&self) -> &F {
        &self.network
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Route an event to its handler and wait for it to finish.
    pub async fn dispatch(&self, event: Event) -> Result<EventOutcome, Error> {
        match event {
            Event::Install => self.install().await.map(EventOutcome::Installed),
            Event::Activate => self.activate().await.map(EventOutcome::Activated),
            Event::Fetch(request) => Ok(EventOutcome::Fetch(self.handle_fetch(request).await)),
            Event::Sync { tag } => {
                self.handle_sync(&tag);
                Ok(EventOutcome::Handled)
            }
            Event::PeriodicSync { tag } => {
                self.handle_periodic_sync(&tag);
                Ok(EventOutcome::Handled)
            }
            Event::Push { data } => self.handle_push(data.as_deref()).await.map(EventOutcome::Notified),
            Event::NotificationClick { tag } => {
                self.handle_notification_click(tag.as_deref()).await?;
                Ok(EventOutcome::Handled)
            }
        }
    }

    /// Move from one of `from` to `to`, or fail with the current state.
    async fn transition(&self, from: &[WorkerState], to: WorkerState, event: &str) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if !from.contains(&*state) {
            return Err(Error::InvalidState(format!("cannot {event} while {}", *state)));
        }
        tracing::info!(cache_name = %self.settings.cache_name, "worker {} -> {}", *state, to);
        *state = to;
        Ok(())
    }

    async fn set_state(&self, to: WorkerState) {
        *self.state.write().await = to;
    }
}
