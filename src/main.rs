// issi-swcache - service worker caching policy hosted as a caching proxy
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use issi_swcache::cli::Args;
use issi_swcache::config::AppConfig;
use issi_swcache::network::{HttpNetwork, Network};
use issi_swcache::server::{create_router, AppState};
use issi_swcache::utils::logging;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration, flags last
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting issi-swcache v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Origin client
    info!("Fronting origin {}", config.origin.base_url);
    let network: Arc<dyn Network> = Arc::new(HttpNetwork::new(&config.origin)?);

    // Phase 4: Install and activate the configured worker version
    let state = AppState::new(config.clone(), network);
    let worker_state = state.register_initial_worker().await?;
    info!(
        "Worker {} is {}",
        config.cache.version,
        worker_state.as_str()
    );

    // Phase 5: Build and start HTTP server
    let app = create_router(state)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
