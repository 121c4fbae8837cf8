//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_connections_total` (counter): accepted connections
//! - `proxy_active_connections` (gauge): current connection count
//! - `proxy_requests_total` (counter): parsed requests by route
//! - `proxy_upstream_errors_total` (counter): upstream failures by kind
//! - `proxy_images_rewritten_total` (counter): successful overlays
//! - `proxy_relayed_bytes_total` (counter): bytes streamed on the forward path

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_connection_opened() {
    metrics::counter!("proxy_connections_total").increment(1);
    metrics::gauge!("proxy_active_connections").increment(1.0);
}

pub fn record_connection_closed() {
    metrics::gauge!("proxy_active_connections").decrement(1.0);
}

pub fn record_request(route: &'static str) {
    metrics::counter!("proxy_requests_total", "route" => route).increment(1);
}

pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("proxy_upstream_errors_total", "kind" => kind).increment(1);
}

pub fn record_image_rewritten() {
    metrics::counter!("proxy_images_rewritten_total").increment(1);
}

pub fn record_relayed_bytes(bytes: usize) {
    metrics::counter!("proxy_relayed_bytes_total").increment(bytes as u64);
}
