//! Auxiliary event tools: sw_sync, sw_periodic_sync, sw_push and
//! sw_notification_click.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use routine_core::{CacheStorage, Fetch};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::worker::{EffectLog, Event, EventOutcome, HostEffect, Notification, OfflineWorker};

/// Parameters for the sw_sync and sw_periodic_sync tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    /// Registration tag.
    pub tag: String,
}

/// Parameters for the sw_push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Push payload text, usually JSON `{"title": ..., "body": ...}`.
    #[serde(default)]
    pub data: Option<String>,
}

/// Parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// Tag of the clicked notification.
    #[serde(default)]
    pub tag: Option<String>,
}

/// Output shared by the auxiliary event tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventOutput {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    pub effects: Vec<HostEffect>,
}

/// Dispatch an event and report the notification it showed, if any.
async fn deliver<S, F>(
    worker: &OfflineWorker<S, F, EffectLog>, name: &str, event: Event,
) -> Result<CallToolResult, McpError>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
{
    let notification = match worker.dispatch(event).await? {
        EventOutcome::Notified(notification) => Some(notification),
        _ => None,
    };
    let effects = worker.host().drain().await;
    json_result(&EventOutput { event: name.to_string(), notification, effects })
}

pub async fn sync_impl<S, F>(worker: &OfflineWorker<S, F, EffectLog>, params: SyncParams) -> Result<CallToolResult, McpError>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
{
    deliver(worker, "sync", Event::Sync { tag: params.tag }).await
}

pub async fn periodic_sync_impl<S, F>(
    worker: &OfflineWorker<S, F, EffectLog>, params: SyncParams,
) -> Result<CallToolResult, McpError>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
{
    deliver(worker, "periodicsync", Event::PeriodicSync { tag: params.tag }).await
}

pub async fn push_impl<S, F>(worker: &OfflineWorker<S, F, EffectLog>, params: PushParams) -> Result<CallToolResult, McpError>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
{
    let data = params.data.map(String::into_bytes);
    deliver(worker, "push", Event::Push { data }).await
}

pub async fn notification_click_impl<S, F>(
    worker: &OfflineWorker<S, F, EffectLog>, params: NotificationClickParams,
) -> Result<CallToolResult, McpError>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
{
    deliver(worker, "notificationclick", Event::NotificationClick { tag: params.tag }).await
}
