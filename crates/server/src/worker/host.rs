//! Client and notification requests the worker makes of its host.

use async_trait::async_trait;
use routine_core::Error;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use url::Url;

/// A notification the worker asks the host to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Host runtime services available to the worker.
#[async_trait]
pub trait ClientHost: Send + Sync {
    /// Activate the freshly installed worker without waiting for old clients to close.
    async fn skip_waiting(&self) -> Result<(), Error>;

    /// Take control of every open in-scope page.
    async fn claim(&self) -> Result<(), Error>;

    /// Open a page, or focus it if already open.
    async fn open_window(&self, url: &Url) -> Result<(), Error>;

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;

    async fn close_notification(&self, tag: Option<&str>) -> Result<(), Error>;
}

/// One host request, as recorded by [`EffectLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum HostEffect {
    SkipWaiting,
    ClaimClients,
    OpenWindow { url: String },
    ShowNotification { notification: Notification },
    CloseNotification { tag: Option<String> },
}

/// Host implementation that records requests for the caller to act on.
///
/// The MCP bridge drains the log after each event and returns the effects in
/// the tool output.
#[derive(Debug, Default)]
pub struct EffectLog {
    effects: Mutex<Vec<HostEffect>>,
}

impl EffectLog {
    pub fn new() -> Self {
        Self::default()
    }

    async fn record(&self, effect: HostEffect) {
        tracing::debug!(?effect, "host effect requested");
        self.effects.lock().await.push(effect);
    }

    /// Take every effect recorded so far.
    pub async fn drain(&self) -> Vec<HostEffect> {
        std::mem::take(&mut *self.effects.lock().await)
    }
}

#[async_trait]
impl ClientHost for EffectLog {
    async fn skip_waiting(&self) -> Result<(), Error> {
        self.record(HostEffect::SkipWaiting).await;
        Ok(())
    }

    async fn claim(&self) -> Result<(), Error> {
        self.record(HostEffect::ClaimClients).await;
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        self.record(HostEffect::OpenWindow { url: url.to_string() }).await;
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        self.record(HostEffect::ShowNotification { notification: notification.clone() })
            .await;
        Ok(())
    }

    async fn close_notification(&self, tag: Option<&str>) -> Result<(), Error> {
        self.record(HostEffect::CloseNotification { tag: tag.map(str::to_string) })
            .await;
        Ok(())
    }
}
