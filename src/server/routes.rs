// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{
    click_notification_handler, health_handler, message_handler, metrics_handler,
    notifications_handler, proxy_handler, push_handler, sync_handler, update_handler,
};
use super::middleware::request_id_layers;
use super::platform::ServerPlatform;
use crate::cache::CacheStorage;
use crate::config::AppConfig;
use crate::error::Result;
use crate::network::Network;
use crate::worker::{AssetCacheManager, Platform, Registration, WorkerState};
use axum::{routing::{get, post}, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Prefix of the control API; every other path is a fetch event.
pub const CONTROL_PREFIX: &str = "/__sw";

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registration: Registration,
    storage: CacheStorage,
    pub(crate) network: Arc<dyn Network>,
    pub platform: Arc<ServerPlatform>,
}

impl AppState {
    pub fn new(config: AppConfig, network: Arc<dyn Network>) -> Self {
        Self {
            config,
            registration: Registration::new(),
            storage: CacheStorage::new(),
            network,
            platform: Arc::new(ServerPlatform::new()),
        }
    }

    /// Partitions shared by every worker version this host registers
    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// Build a worker for `version` sharing this host's storage and network
    pub fn build_worker(&self, version: &str) -> Arc<AssetCacheManager> {
        let mut config = self.config.clone();
        config.cache.version = version.to_string();
        let platform: Arc<dyn Platform> = self.platform.clone();
        Arc::new(AssetCacheManager::new(
            &config,
            self.storage.clone(),
            self.network.clone(),
            platform,
        ))
    }

    /// Register the configured version; used once at startup
    pub async fn register_initial_worker(&self) -> Result<WorkerState> {
        let worker = self.build_worker(&self.config.cache.version);
        self.registration.register(worker).await
    }
}

pub fn create_router(state: AppState) -> Result<Router> {
    let (set_request_id, propagate_request_id) = request_id_layers();
    let body_limit = state.config.server.body_limit_bytes;

    let control = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/message", post(message_handler))
        .route("/push", post(push_handler))
        .route("/sync/:tag", post(sync_handler))
        .route("/notifications", get(notifications_handler))
        .route("/notifications/:id/click", post(click_notification_handler))
        .route("/update", post(update_handler));

    let app = Router::new()
        .nest(CONTROL_PREFIX, control)
        .fallback(proxy_handler)
        .layer(tower_http::limit::RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}
