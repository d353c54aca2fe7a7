//! Push payloads, notifications, and the platform surface they are shown on.
//!
//! The worker never draws anything itself: it builds a [`Notification`] from
//! a push payload and hands it to a [`Platform`], the host's stand-in for the
//! browser's notification and window-client APIs.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::PushConfig;
use crate::error::{Result, WorkerError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JSON body of a push message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub primary_key: Option<serde_json::Value>,
    /// Window to focus or open when the notification is clicked.
    #[serde(default)]
    pub url: Option<String>,
}

impl PushPayload {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| WorkerError::InvalidPush(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Data carried with a notification and read back on click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub date_of_arrival: DateTime<Utc>,
    pub primary_key: Option<serde_json::Value>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

pub const ACTION_EXPLORE: &str = "explore";
pub const ACTION_CLOSE: &str = "close";

impl Notification {
    /// Render a push payload with the configured icon, badge and vibration.
    pub fn from_push(payload: PushPayload, config: &PushConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: payload.title,
            body: payload.body,
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            vibrate: config.vibrate.clone(),
            data: NotificationData {
                date_of_arrival: Utc::now(),
                primary_key: payload.primary_key,
                url: payload.url.unwrap_or_else(|| config.default_url.clone()),
            },
            actions: vec![
                NotificationAction {
                    action: ACTION_EXPLORE.to_string(),
                    title: "View Details".to_string(),
                },
                NotificationAction {
                    action: ACTION_CLOSE.to_string(),
                    title: "Close".to_string(),
                },
            ],
        }
    }
}

/// A click on a shown notification, optionally on one of its actions.
#[derive(Debug, Clone)]
pub struct NotificationClick {
    pub notification: Notification,
    pub action: Option<String>,
}

/// An open page controlled by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowClient {
    pub id: Uuid,
    pub url: String,
    pub focused: bool,
}

/// Browser-side APIs the worker calls out to.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn show_notification(&self, notification: Notification) -> Result<()>;

    async fn close_notification(&self, id: Uuid) -> Result<()>;

    /// Window clients currently open in scope
    async fn window_clients(&self) -> Vec<WindowClient>;

    async fn focus(&self, client: &WindowClient) -> Result<WindowClient>;

    async fn open_window(&self, url: &str) -> Result<WindowClient>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload_camel_case() {
        let payload = PushPayload::parse(br#"{"title":"New role","body":"Backend engineer","primaryKey":7}"#).unwrap();
        assert_eq!(payload.title, "New role");
        assert_eq!(payload.primary_key, Some(serde_json::json!(7)));
        assert!(payload.url.is_none());
    }

    #[test]
    fn test_parse_malformed_payload() {
        assert!(matches!(PushPayload::parse(b"not json"), Err(WorkerError::InvalidPush(_))));
        assert!(matches!(PushPayload::parse(br#"{"body":"no title"}"#), Err(WorkerError::InvalidPush(_))));
    }

    #[test]
    fn test_from_push_uses_config_and_default_url() {
        let payload = PushPayload {
            title: "t".into(),
            body: "b".into(),
            primary_key: None,
            url: None,
        };
        let notification = Notification::from_push(payload, &PushConfig::default());

        assert_eq!(notification.icon, "/icons/icon-192x192.png");
        assert_eq!(notification.vibrate, vec![100, 50, 100]);
        assert_eq!(notification.data.url, "/");
        assert_eq!(notification.actions.len(), 2);
        assert_eq!(notification.actions[0].action, ACTION_EXPLORE);
    }
}
