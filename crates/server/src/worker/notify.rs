//! Auxiliary hooks: background sync, push and notification clicks.

use routine_core::{CacheStorage, Error, Fetch};
use serde::Deserialize;

use super::{ClientHost, Notification, OfflineWorker};

/// Push payload shape. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
}

impl PushPayload {
    /// Parse a payload, treating anything unreadable as empty.
    fn parse(data: Option<&[u8]>) -> Self {
        let Some(bytes) = data.filter(|b| !b.is_empty()) else {
            return Self::default();
        };
        serde_json::from_slice(bytes).unwrap_or_else(|e| {
            tracing::debug!("ignoring malformed push payload: {}", e);
            Self::default()
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl<S, F, H> OfflineWorker<S, F, H>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
    H: ClientHost + 'static,
{
    pub fn handle_sync(&self, tag: &str) {
        tracing::debug!(tag, "background sync");
    }

    pub fn handle_periodic_sync(&self, tag: &str) {
        tracing::debug!(tag, "periodic sync");
    }

    /// Show a notification built from the push payload.
    pub async fn handle_push(&self, data: Option<&[u8]>) -> Result<Notification, Error> {
        let payload = PushPayload::parse(data);
        let notification = Notification {
            title: non_blank(payload.title).unwrap_or_else(|| self.settings.push_title.clone()),
            body: non_blank(payload.body).unwrap_or_else(|| self.settings.push_body.clone()),
            icon: self.settings.notification_icon.clone(),
            badge: self.settings.notification_badge.clone(),
            tag: None,
        };

        self.host.show_notification(&notification).await?;
        Ok(notification)
    }

    /// Dismiss the clicked notification and bring the app forward.
    pub async fn handle_notification_click(&self, tag: Option<&str>) -> Result<(), Error> {
        self.host.close_notification(tag).await?;
        self.host.open_window(&self.settings.open_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{ScriptedFetch, settings, worker_with};
    use super::super::{Event, EventOutcome, HostEffect};

    #[tokio::test]
    async fn test_push_uses_payload_fields() {
        let worker = worker_with(settings("v1"), ScriptedFetch::offline()).await;

        let shown = worker
            .handle_push(Some(br#"{"title":"Hi","body":"New post"}"#))
            .await
            .unwrap();

        assert_eq!(shown.title, "Hi");
        assert_eq!(shown.body, "New post");
        assert_eq!(shown.icon, "icons/icon-192.png");
        assert_eq!(shown.badge, "icons/icon-192.png");
        assert_eq!(worker.host().drain().await, vec![HostEffect::ShowNotification { notification: shown }]);
    }

    #[tokio::test]
    async fn test_push_without_payload_uses_defaults() {
        let worker = worker_with(settings("v1"), ScriptedFetch::offline()).await;

        let shown = worker.handle_push(None).await.unwrap();

        assert_eq!(shown.title, "Update available");
        assert_eq!(shown.body, "Open the app to see what's new.");
    }

    #[tokio::test]
    async fn test_push_malformed_payload_uses_defaults() {
        let worker = worker_with(settings("v1"), ScriptedFetch::offline()).await;

        let shown = worker.handle_push(Some(b"not json")).await.unwrap();
        assert_eq!(shown.title, "Update available");

        let shown = worker.handle_push(Some(br#"{"title":"  "}"#)).await.unwrap();
        assert_eq!(shown.title, "Update available");
    }

    #[tokio::test]
    async fn test_push_partial_payload() {
        let worker = worker_with(settings("v1"), ScriptedFetch::offline()).await;

        let shown = worker.handle_push(Some(br#"{"body":"Only body"}"#)).await.unwrap();

        assert_eq!(shown.title, "Update available");
        assert_eq!(shown.body, "Only body");
    }

    #[tokio::test]
    async fn test_notification_click_closes_then_opens_root() {
        let worker = worker_with(settings("v1"), ScriptedFetch::offline()).await;

        let outcome = worker
            .dispatch(Event::NotificationClick { tag: Some("update".into()) })
            .await
            .unwrap();

        assert!(matches!(outcome, EventOutcome::Handled));
        assert_eq!(
            worker.host().drain().await,
            vec![
                HostEffect::CloseNotification { tag: Some("update".into()) },
                HostEffect::OpenWindow { url: "http://localhost:8080/".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_sync_events_have_no_effects() {
        let worker = worker_with(settings("v1"), ScriptedFetch::offline()).await;

        worker.dispatch(Event::Sync { tag: "sync-data".into() }).await.unwrap();
        worker.dispatch(Event::PeriodicSync { tag: "refresh".into() }).await.unwrap();

        assert!(worker.host().drain().await.is_empty());
        assert!(worker.network().requests().is_empty());
    }
}
