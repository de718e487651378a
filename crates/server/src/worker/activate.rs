//! Activate phase: drop stale generations and take control of open pages.

use futures_util::future::join_all;
use routine_core::{CacheStorage, Error, Fetch};
use serde::{Deserialize, Serialize};

use super::{ClientHost, OfflineWorker, WorkerState};

/// Result of an activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateReport {
    pub cache_name: String,
    /// Generations removed, in creation order.
    pub deleted: Vec<String>,
}

impl<S, F, H> OfflineWorker<S, F, H>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
    H: ClientHost + 'static,
{
    /// Delete every generation other than the current one and claim clients.
    ///
    /// Both run concurrently and both must succeed; on failure the worker
    /// stays installed so activation can be retried.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.transition(&[WorkerState::Installed], WorkerState::Activating, "activate")
            .await?;

        let (deleted, claimed) = tokio::join!(self.delete_stale(), self.host.claim());

        let deleted = match (deleted, claimed) {
            (Ok(deleted), Ok(())) => deleted,
            (Err(e), _) | (_, Err(e)) => {
                self.set_state(WorkerState::Installed).await;
                return Err(e);
            }
        };

        self.set_state(WorkerState::Activated).await;
        tracing::info!(cache_name = %self.settings.cache_name, deleted = ?deleted, "activation complete");

        Ok(ActivateReport { cache_name: self.settings.cache_name.clone(), deleted })
    }

    async fn delete_stale(&self) -> Result<Vec<String>, Error> {
        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| *name != self.settings.cache_name)
            .collect();

        let results = join_all(stale.iter().map(|name| self.storage.delete(name))).await;

        let mut deleted = Vec::with_capacity(stale.len());
        for (name, result) in stale.into_iter().zip(results) {
            if result? {
                deleted.push(name);
            }
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{ScriptedFetch, html, settings, worker_on, worker_with};
    use super::super::{HostEffect, WorkerState};
    use super::*;
    use routine_core::CacheDb;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_activate_deletes_stale_generations() {
        let storage = Arc::new(CacheDb::open_in_memory().await.unwrap());
        storage.open("routine-cache-v1").await.unwrap();
        storage.open("unrelated").await.unwrap();

        let worker = worker_on(Arc::clone(&storage), settings("routine-cache-v2"), ScriptedFetch::offline());
        worker.install().await.unwrap();
        let report = worker.activate().await.unwrap();

        assert_eq!(report.deleted, vec!["routine-cache-v1", "unrelated"]);
        assert_eq!(storage.keys().await.unwrap(), vec!["routine-cache-v2"]);
    }

    #[tokio::test]
    async fn test_sequential_generations_leave_only_latest() {
        let storage = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let fetch = || ScriptedFetch::offline().route("http://localhost:8080/", html("home"));

        let v1 = worker_on(Arc::clone(&storage), settings("v1"), fetch());
        v1.install().await.unwrap();
        v1.activate().await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["v1"]);

        let v2 = worker_on(Arc::clone(&storage), settings("v2"), fetch());
        v2.install().await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["v1", "v2"]);

        let report = v2.activate().await.unwrap();
        assert_eq!(report.deleted, vec!["v1"]);
        assert_eq!(storage.keys().await.unwrap(), vec!["v2"]);
    }

    #[tokio::test]
    async fn test_activate_claims_clients() {
        let worker = worker_with(settings("v1"), ScriptedFetch::offline()).await;
        worker.install().await.unwrap();
        worker.host().drain().await;

        worker.activate().await.unwrap();

        assert_eq!(worker.host().drain().await, vec![HostEffect::ClaimClients]);
        assert_eq!(worker.state().await, WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_activate_twice_rejected() {
        let worker = worker_with(settings("v1"), ScriptedFetch::offline()).await;
        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        assert!(matches!(worker.activate().await, Err(Error::InvalidState(_))));
    }
}
