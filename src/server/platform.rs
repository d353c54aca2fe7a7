// In-process platform: notifications and window clients for the HTTP host
// Author: kelexine (https://github.com/kelexine)

use crate::error::{Result, WorkerError};
use crate::worker::{Notification, Platform, WindowClient};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::info;
use uuid::Uuid;

const MAX_NOTIFICATIONS: usize = 50;
const MAX_WINDOWS: usize = 20;

/// Keeps shown notifications and opened windows in memory so the control
/// API can list them and act on clicks.
#[derive(Default)]
pub struct ServerPlatform {
    notifications: Mutex<VecDeque<Notification>>,
    windows: Mutex<VecDeque<WindowClient>>,
}

impl ServerPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications currently shown, oldest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().iter().cloned().collect()
    }

    pub fn notification(&self, id: Uuid) -> Option<Notification> {
        self.notifications.lock().iter().find(|n| n.id == id).cloned()
    }
}

#[async_trait]
impl Platform for ServerPlatform {
    async fn show_notification(&self, notification: Notification) -> Result<()> {
        info!("Notification: {} - {}", notification.title, notification.body);
        let mut notifications = self.notifications.lock();
        if notifications.len() >= MAX_NOTIFICATIONS {
            notifications.pop_front();
        }
        notifications.push_back(notification);
        Ok(())
    }

    async fn close_notification(&self, id: Uuid) -> Result<()> {
        self.notifications.lock().retain(|n| n.id != id);
        Ok(())
    }

    async fn window_clients(&self) -> Vec<WindowClient> {
        self.windows.lock().iter().cloned().collect()
    }

    async fn focus(&self, client: &WindowClient) -> Result<WindowClient> {
        let mut windows = self.windows.lock();
        let mut focused = None;
        for window in windows.iter_mut() {
            window.focused = window.id == client.id;
            if window.focused {
                focused = Some(window.clone());
            }
        }
        focused.ok_or_else(|| WorkerError::Platform(format!("window {} is gone", client.id)))
    }

    async fn open_window(&self, url: &str) -> Result<WindowClient> {
        let client = WindowClient {
            id: Uuid::new_v4(),
            url: url.to_string(),
            focused: true,
        };

        let mut windows = self.windows.lock();
        for window in windows.iter_mut() {
            window.focused = false;
        }
        if windows.len() >= MAX_WINDOWS {
            windows.pop_front();
        }
        windows.push_back(client.clone());
        Ok(client)
    }
}
