//! sw_install and sw_activate tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use routine_core::{CacheStorage, Fetch};
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::worker::{ActivateReport, EffectLog, HostEffect, InstallReport, OfflineWorker};

/// Output from the sw_install tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallOutput {
    #[serde(flatten)]
    pub report: InstallReport,
    pub effects: Vec<HostEffect>,
}

/// Output from the sw_activate tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateOutput {
    #[serde(flatten)]
    pub report: ActivateReport,
    pub effects: Vec<HostEffect>,
}

/// Implementation of the sw_install tool.
pub async fn install_impl<S, F>(worker: &OfflineWorker<S, F, EffectLog>) -> Result<CallToolResult, McpError>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
{
    let report = worker.install().await?;
    let effects = worker.host().drain().await;
    json_result(&InstallOutput { report, effects })
}

/// Implementation of the sw_activate tool.
///
/// The effect log is drained even when activation fails, so a claim issued
/// alongside a failed cleanup is not reported by the next tool call.
pub async fn activate_impl<S, F>(worker: &OfflineWorker<S, F, EffectLog>) -> Result<CallToolResult, McpError>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
{
    let result = worker.activate().await;
    let effects = worker.host().drain().await;
    match result {
        Ok(report) => json_result(&ActivateOutput { report, effects }),
        Err(e) => {
            tracing::debug!("activation failed, discarding {} host effects", effects.len());
            Err(e.into())
        }
    }
}
