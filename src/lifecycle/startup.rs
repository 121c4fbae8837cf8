//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Load the image pool once; it is immutable afterwards
//! - Bind the listener and begin accepting traffic
//! - Wire OS signals to graceful shutdown
//!
//! # Design Decisions
//! - Fail fast: a bind failure is fatal
//! - An empty or missing image folder is not fatal; image routes answer 404
//! - The listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ProxyConfig;
use crate::http::ProxyServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::{Listener, ListenerError};
use crate::observability::metrics;
use crate::pool::ImagePool;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("server failed: {0}")]
    Server(#[from] std::io::Error),
}

/// Run the proxy until SIGINT/SIGTERM, then shut down gracefully.
pub async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        trigger.trigger();
    });

    run_until(config, shutdown).await
}

/// Run the proxy until `shutdown` is triggered.
pub async fn run_until(config: ProxyConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let pool = Arc::new(ImagePool::load(&config.images.folder));
    if pool.is_empty() {
        tracing::warn!(folder = %config.images.folder.display(), "Image pool is empty; image routes will answer 404");
    }

    let listener = Listener::bind(&config.listener).await?;
    let server = ProxyServer::new(&config, pool);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
