// Asset cache manager - one service worker version and its lifecycle hooks
// Author: kelexine (https://github.com/kelexine)

use super::classify::{Classifier, RequestClass};
use super::notification::{Notification, NotificationClick, Platform, PushPayload, WindowClient, ACTION_CLOSE};
use super::state::{ClientMessage, WorkerState};
use super::strategy::{FetchOutcome, Strategies};
use super::sync::{BackgroundSync, NoBackgroundSync};
use crate::cache::{CacheKey, CacheStorage, PartitionNames, PartitionRole, StoredResponse};
use crate::config::{AppConfig, CacheConfig, PushConfig};
use crate::error::{Result, WorkerError};
use crate::metrics;
use crate::network::{FetchRequest, Network};
use axum::http::Method;
use futures::future::try_join_all;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One version of the caching worker.
///
/// The host invokes the named hooks (`on_install`, `on_activate`,
/// `on_fetch`, `on_message`, `on_sync`, `on_push`,
/// `on_notification_click`); everything the worker touches outside itself
/// goes through the [`Network`], [`CacheStorage`] and [`Platform`] it was
/// built with.
pub struct AssetCacheManager {
    names: PartitionNames,
    cache_config: CacheConfig,
    push_config: PushConfig,
    sync_tag: String,
    storage: CacheStorage,
    network: Arc<dyn Network>,
    platform: Arc<dyn Platform>,
    background_sync: Arc<dyn BackgroundSync>,
    classifier: Classifier,
    strategies: Strategies,
    state: RwLock<WorkerState>,
}

impl AssetCacheManager {
    pub fn new(
        config: &AppConfig,
        storage: CacheStorage,
        network: Arc<dyn Network>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        let names = PartitionNames::new(config.cache.version.clone());
        let strategies = Strategies::new(
            network.clone(),
            storage.clone(),
            names.name(PartitionRole::Static),
            &config.cache.offline_path,
        );

        Self {
            classifier: Classifier::new(&config.cache),
            cache_config: config.cache.clone(),
            push_config: config.push.clone(),
            sync_tag: config.sync.tag.clone(),
            names,
            storage,
            network,
            platform,
            background_sync: Arc::new(NoBackgroundSync),
            strategies,
            state: RwLock::new(WorkerState::Parsed),
        }
    }

    /// Replace the operation swept on background sync
    pub fn with_background_sync(mut self, sync: Arc<dyn BackgroundSync>) -> Self {
        self.background_sync = sync;
        self
    }

    pub fn version(&self) -> &str {
        self.names.version()
    }

    pub fn partition_names(&self) -> &PartitionNames {
        &self.names
    }

    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    fn transition(&self, to: WorkerState) {
        let from = std::mem::replace(&mut *self.state.write(), to);
        info!("Worker {} {} -> {}", self.version(), from.as_str(), to.as_str());
        metrics::record_lifecycle(to.as_str());
    }

    fn expect_state(&self, expected: WorkerState, hook: &str) -> Result<()> {
        let current = self.state();
        if current != expected {
            return Err(WorkerError::Lifecycle(format!(
                "{} requires state {}, worker {} is {}",
                hook,
                expected.as_str(),
                self.version(),
                current.as_str()
            )));
        }
        Ok(())
    }

    pub(crate) fn mark_redundant(&self) {
        if self.state() != WorkerState::Redundant {
            self.transition(WorkerState::Redundant);
        }
    }

    /// Precache the manifest into the static partition.
    ///
    /// Every path must come back ok or nothing is written and the worker
    /// becomes redundant.
    pub async fn on_install(&self) -> Result<()> {
        self.expect_state(WorkerState::Parsed, "install")?;
        self.transition(WorkerState::Installing);

        match self.precache().await {
            Ok(count) => {
                info!("Precached {} entries into {}", count, self.names.name(PartitionRole::Static));
                self.transition(WorkerState::Installed);
                Ok(())
            }
            Err(e) => {
                warn!("Install of worker {} failed: {}", self.version(), e);
                self.transition(WorkerState::Redundant);
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize> {
        let fetches = self.cache_config.precache.iter().map(|path| async move {
            let request = FetchRequest::get(path.clone());
            let response = self.network.fetch(&request).await.map_err(|e| WorkerError::Precache {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            if !response.is_ok() {
                return Err(WorkerError::Precache {
                    path: path.clone(),
                    reason: format!("origin answered {}", response.status),
                });
            }
            Ok::<(CacheKey, StoredResponse), WorkerError>((request.cache_key(), response))
        });

        let entries = try_join_all(fetches).await?;
        let count = entries.len();

        let partition = self.storage.open(&self.names.name(PartitionRole::Static)).await;
        partition.put_all(entries).await;
        metrics::update_partition_entries(partition.name(), partition.len().await);

        Ok(count)
    }

    /// Delete every partition this version does not recognise, then take
    /// control. Returns the names of the deleted partitions.
    pub async fn on_activate(&self) -> Result<Vec<String>> {
        self.expect_state(WorkerState::Installed, "activate")?;
        self.transition(WorkerState::Activating);

        let mut deleted = Vec::new();
        for name in self.storage.keys().await {
            if !self.names.contains(&name) && self.storage.delete(&name).await {
                info!("Deleted stale cache partition {}", name);
                metrics::update_partition_entries(&name, 0);
                deleted.push(name);
            }
        }

        self.transition(WorkerState::Activated);
        info!("Worker {} claimed all clients", self.version());
        Ok(deleted)
    }

    /// Handle one intercepted request.
    ///
    /// Returns `None` for anything but GET: the host must send those to the
    /// network untouched, without reading or writing any partition. A worker
    /// that is not activated also returns `None`, so a superseded version
    /// cannot reopen partitions its successor purged.
    pub async fn on_fetch(&self, request: &FetchRequest) -> Option<FetchOutcome> {
        if request.method != Method::GET {
            debug!("Passing through {} {}", request.method, request.url);
            metrics::record_passthrough(request.method.as_str());
            return None;
        }

        let state = self.state();
        if state != WorkerState::Activated {
            debug!(
                "Worker {} is {}, passing {} through",
                self.version(),
                state.as_str(),
                request.url
            );
            metrics::record_passthrough(request.method.as_str());
            return None;
        }

        let class = self.classify(request);
        let route = class.route();
        metrics::record_fetch(class.as_str(), route.strategy.as_str());
        debug!(
            "{} classified as {} -> {} on {}",
            request.url,
            class.as_str(),
            route.strategy.as_str(),
            route.partition.as_str()
        );

        let partition = self.storage.open(&self.names.name(route.partition)).await;
        Some(self.strategies.run(route.strategy, request, partition).await)
    }

    pub fn classify(&self, request: &FetchRequest) -> RequestClass {
        self.classifier.classify(request)
    }

    /// Returns true when the message asks this worker to stop waiting.
    pub fn on_message(&self, message: &ClientMessage) -> bool {
        match message {
            ClientMessage::SkipWaiting => {
                info!("Worker {} asked to skip waiting", self.version());
                true
            }
            ClientMessage::Unknown => {
                debug!("Ignoring unknown client message");
                false
            }
        }
    }

    /// Run one background sweep if `tag` is ours. Returns whether a sweep ran.
    pub async fn on_sync(&self, tag: &str) -> Result<bool> {
        if tag != self.sync_tag {
            debug!("Ignoring sync event with tag {}", tag);
            metrics::record_sync("ignored");
            return Ok(false);
        }

        match self.background_sync.sweep().await {
            Ok(()) => {
                info!("Background sync sweep completed");
                metrics::record_sync("success");
                Ok(true)
            }
            Err(e) => {
                warn!("Background sync sweep failed: {}", e);
                metrics::record_sync("failure");
                Err(WorkerError::Sync(e.to_string()))
            }
        }
    }

    /// Show a notification for a JSON push payload.
    ///
    /// Malformed payloads are rejected with `InvalidPush`; nothing is shown.
    pub async fn on_push(&self, payload: &[u8]) -> Result<Notification> {
        let payload = match PushPayload::parse(payload) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Rejected push message: {}", e);
                metrics::record_notification("rejected");
                return Err(e);
            }
        };

        let notification = Notification::from_push(payload, &self.push_config);
        self.platform.show_notification(notification.clone()).await?;
        metrics::record_notification("shown");
        debug!("Showing notification {} ({})", notification.id, notification.title);

        Ok(notification)
    }

    /// Close the notification and, unless `close` was chosen, focus a window
    /// already at its URL or open a new one there.
    pub async fn on_notification_click(&self, click: NotificationClick) -> Result<Option<WindowClient>> {
        let notification = click.notification;
        self.platform.close_notification(notification.id).await?;

        if click.action.as_deref() == Some(ACTION_CLOSE) {
            metrics::record_notification("closed");
            return Ok(None);
        }
        metrics::record_notification("clicked");

        let url = notification.data.url;
        let existing = self
            .platform
            .window_clients()
            .await
            .into_iter()
            .find(|client| client.url == url);

        let client = match existing {
            Some(client) => self.platform.focus(&client).await?,
            None => self.platform.open_window(&url).await?,
        };
        Ok(Some(client))
    }

    /// Entry counts of this version's partitions that exist
    pub async fn partition_sizes(&self) -> Vec<(String, usize)> {
        let mut sizes = Vec::new();
        for name in self.names.all() {
            if self.storage.has(&name).await {
                let partition = self.storage.open(&name).await;
                sizes.push((name, partition.len().await));
            }
        }
        sizes
    }
}
