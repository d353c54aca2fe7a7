// Shared fixtures for integration tests
// Author: kelexine (https://github.com/kelexine)

#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::StatusCode;
use issi_swcache::cache::{CacheStorage, StoredResponse};
use issi_swcache::config::AppConfig;
use issi_swcache::network::{FetchRequest, Network, NetworkError};
use issi_swcache::server::ServerPlatform;
use issi_swcache::worker::AssetCacheManager;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Scripted origin: answers from a URL table, can go offline, and can hold
/// fetches until released.
#[derive(Default)]
pub struct FakeNetwork {
    responses: Mutex<HashMap<String, StoredResponse>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, status: StatusCode, body: &'static str) {
        self.responses
            .lock()
            .insert(url.to_string(), StoredResponse::new(status, body));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Hold every fetch until the returned handle is notified
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse, NetworkError> {
        self.calls.lock().push(request.url.clone());

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(NetworkError::Connect("network is offline".into()));
        }

        Ok(self
            .responses
            .lock()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| StoredResponse::new(StatusCode::NOT_FOUND, "not found")))
    }
}

pub fn test_config(version: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.cache.version = version.to_string();
    config.cache.precache = vec!["/".to_string(), "/manifest.json".to_string()];
    config
}

/// Origin that serves the precache manifest of `test_config`
pub fn online_origin() -> Arc<FakeNetwork> {
    let network = FakeNetwork::new();
    network.respond("/", StatusCode::OK, "<html>home</html>");
    network.respond("/manifest.json", StatusCode::OK, "{\"name\":\"ISSI\"}");
    network
}

pub fn build_worker(
    config: &AppConfig,
    storage: &CacheStorage,
    network: Arc<FakeNetwork>,
    platform: Arc<ServerPlatform>,
) -> Arc<AssetCacheManager> {
    Arc::new(AssetCacheManager::new(config, storage.clone(), network, platform))
}

/// An installed and activated worker for `version`
pub async fn active_worker(
    version: &str,
    storage: &CacheStorage,
    network: Arc<FakeNetwork>,
) -> Arc<AssetCacheManager> {
    let worker = build_worker(&test_config(version), storage, network, Arc::new(ServerPlatform::new()));
    worker.on_install().await.expect("install");
    worker.on_activate().await.expect("activate");
    worker
}
