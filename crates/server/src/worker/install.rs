//! Install phase: precache the shell into the current generation.

use futures_util::future::join_all;
use routine_core::{CacheMode, CacheStorage, Error, Fetch, Request};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ClientHost, OfflineWorker, WorkerState};

/// A manifest entry that was not cached, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub url: String,
    pub reason: String,
}

/// Result of an install.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallReport {
    pub cache_name: String,
    /// URLs stored into the generation, in manifest order.
    pub cached: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
}

impl<S, F, H> OfflineWorker<S, F, H>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
    H: ClientHost + 'static,
{
    /// Open the current generation and precache every manifest entry.
    ///
    /// Entries are fetched concurrently and each one is best-effort: a failed
    /// fetch, a non-2xx status or a failed write only lands the URL in
    /// `skipped`. The install itself fails only if the generation cannot be
    /// opened or the worker is already past installation.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.transition(&[WorkerState::Parsed, WorkerState::Installed], WorkerState::Installing, "install")
            .await?;

        let report = match self.precache().await {
            Ok(report) => report,
            Err(e) => {
                self.set_state(WorkerState::Parsed).await;
                return Err(e);
            }
        };

        self.set_state(WorkerState::Installed).await;

        if let Err(e) = self.host.skip_waiting().await {
            tracing::warn!("skip waiting refused: {}", e);
        }

        tracing::info!(
            cache_name = %report.cache_name,
            cached = report.cached.len(),
            skipped = report.skipped.len(),
            "install complete"
        );

        Ok(report)
    }

    async fn precache(&self) -> Result<InstallReport, Error> {
        let cache_name = &self.settings.cache_name;
        self.storage.open(cache_name).await?;

        let attempts = self
            .settings
            .precache
            .iter()
            .map(|url| async move { (url, self.precache_one(url).await) });

        let mut cached = Vec::new();
        let mut skipped = Vec::new();
        for (url, result) in join_all(attempts).await {
            match result {
                Ok(()) => cached.push(url.to_string()),
                Err(reason) => {
                    tracing::debug!("precache skipped {}: {}", url, reason);
                    skipped.push(SkippedEntry { url: url.to_string(), reason });
                }
            }
        }

        Ok(InstallReport { cache_name: cache_name.clone(), cached, skipped })
    }

    async fn precache_one(&self, url: &Url) -> Result<(), String> {
        let request = Request::get(url.clone()).with_cache(CacheMode::NoCache);

        let response = self.network.fetch(&request).await.map_err(|e| e.to_string())?;
        if !response.is_ok() {
            return Err(format!("status {}", response.status));
        }

        self.storage
            .put(&self.settings.cache_name, &request, &response)
            .await
            .map_err(|e| e.to_string())
    }
}
