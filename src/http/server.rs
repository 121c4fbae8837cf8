//! Proxy server: accept loop and per-connection handling.
//!
//! # Responsibilities
//! - Accept connections and spawn one task per connection
//! - Read the request once, parse it, dispatch to exactly one handler
//! - Close the client socket on every exit path
//! - Stop accepting on shutdown and drain in-flight connections

use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::compositor::{Compositor, RasterCodec};
use crate::config::{ProxyConfig, RelayConfig, TimeoutConfig};
use crate::handlers::{easter_egg, forward, image_overlay, meme_image, HandlerError};
use crate::http::request::{ProxyRequest, MAX_REQUEST_BYTES};
use crate::net::{ConnectionTracker, Listener};
use crate::observability::metrics;
use crate::pool::ImagePool;
use crate::resilience::timeouts::with_idle_timeout;
use crate::routing::{Route, Router};

/// Shared, read-only state injected into every connection task.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
    pub pool: Arc<ImagePool>,
    pub compositor: Arc<Compositor>,
    pub relay: RelayConfig,
    pub timeouts: TimeoutConfig,
}

impl AppState {
    pub fn new(config: &ProxyConfig, pool: Arc<ImagePool>) -> Self {
        Self {
            router: Arc::new(Router::from_config(config)),
            pool,
            compositor: Arc::new(Compositor::new(RasterCodec)),
            relay: config.relay.clone(),
            timeouts: config.timeouts.clone(),
        }
    }
}

/// The forward proxy.
pub struct ProxyServer {
    state: AppState,
    tracker: ConnectionTracker,
    shutdown_grace: Duration,
}

impl ProxyServer {
    /// Create a server around an already loaded image pool.
    pub fn new(config: &ProxyConfig, pool: Arc<ImagePool>) -> Self {
        Self {
            state: AppState::new(config, pool),
            tracker: ConnectionTracker::new(),
            shutdown_grace: config.timeouts.shutdown_grace(),
        }
    }

    /// Accept connections until `shutdown` fires, then drain.
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            image_mode = %self.state.router.mode(),
            images = self.state.pool.len(),
            chunk_size = self.state.relay.chunk_size,
            chunk_delay_ms = self.state.relay.chunk_delay_ms,
            "Proxy server starting"
        );

        loop {
            let accepted = tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received; no longer accepting");
                    break;
                }
                accepted = listener.accept() => accepted,
            };

            let (stream, peer, permit) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    // Back off briefly, e.g. when out of file descriptors.
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    continue;
                }
            };

            let guard = self.tracker.track();
            let span = tracing::info_span!("connection", connection_id = %guard.id(), peer_addr = %peer);
            let state = self.state.clone();

            tokio::spawn(
                async move {
                    handle_connection(stream, &state).await;
                    drop(permit);
                    drop(guard);
                }
                .instrument(span),
            );
        }

        let remaining = self.tracker.drain(self.shutdown_grace).await;
        if remaining > 0 {
            tracing::warn!(remaining, "Shutdown grace elapsed with connections still open");
        }
        tracing::info!("Proxy server stopped");
        Ok(())
    }
}

/// Run the full request protocol on one client connection, then close it.
pub async fn handle_connection<S>(mut client: S, state: &AppState)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if let Some(request) = read_request(&mut client, state.timeouts.idle()).await {
        let route = state.router.route(&request);
        metrics::record_request(route.as_str());
        tracing::info!(
            method = request.method(),
            uri = request.target(),
            route = %route,
            "Request routed"
        );

        if let Err(e) = dispatch(&mut client, &request, route, state).await {
            metrics::record_upstream_error(e.kind());
            match &e {
                HandlerError::Upstream(inner) if inner.is_unreachable() => {
                    tracing::warn!(error = %e, "Upstream unreachable");
                }
                _ => tracing::debug!(error = %e, "Connection ended early"),
            }
        }
    }

    let _ = client.shutdown().await;
}

async fn read_request<S>(client: &mut S, idle: Option<Duration>) -> Option<ProxyRequest>
where
    S: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; MAX_REQUEST_BYTES];
    let n = match with_idle_timeout(idle, client.read(&mut buf)).await {
        Ok(0) => {
            tracing::debug!("Client closed before sending a request");
            return None;
        }
        Ok(n) => n,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read request");
            return None;
        }
    };
    buf.truncate(n);

    match ProxyRequest::parse(Bytes::from(buf)) {
        Ok(request) => Some(request),
        Err(e) => {
            tracing::debug!(error = %e, "Malformed request; closing without response");
            None
        }
    }
}

async fn dispatch<S>(client: &mut S, request: &ProxyRequest, route: Route, state: &AppState) -> Result<(), HandlerError>
where
    S: AsyncWrite + Unpin,
{
    match route {
        Route::EasterEgg => easter_egg::serve(client, &state.pool).await?,
        Route::MemeImage => meme_image::serve(client, &state.pool).await?,
        Route::ImageOverlay => image_overlay::serve(client, request, state).await?,
        Route::Forward => forward::serve(client, request, state).await?,
    }
    Ok(())
}
