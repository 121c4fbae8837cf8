//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, backlog, connection cap).
    pub listener: ListenerConfig,

    /// Upstream-to-client relay pacing.
    pub relay: RelayConfig,

    /// Substitute image pool and interception behavior.
    pub images: ImageConfig,

    /// Easter-egg trigger settings.
    pub easter_egg: EasterEggConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Pending-connection queue length passed to `listen(2)`.
    pub backlog: u32,

    /// Soft cap on concurrent connections. Zero means unbounded.
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            backlog: 5,
            max_connections: 0,
        }
    }
}

/// Pacing applied when relaying plain forwarded responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Bytes read from upstream per chunk.
    pub chunk_size: usize,

    /// Delay after each chunk written to the client, in milliseconds. Zero disables pacing.
    pub chunk_delay_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_delay_ms: 1000,
        }
    }
}

impl RelayConfig {
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }
}

/// What the proxy does with requests under the intercepted path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    /// Serve a pool image directly, ignoring the origin.
    #[default]
    Substitute,
    /// Fetch the origin image and paint a pool image over its top half.
    Overlay,
}

impl std::str::FromStr for ImageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "substitute" => Ok(ImageMode::Substitute),
            "overlay" => Ok(ImageMode::Overlay),
            other => Err(format!("unknown image mode '{}' (expected substitute or overlay)", other)),
        }
    }
}

impl std::fmt::Display for ImageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageMode::Substitute => write!(f, "substitute"),
            ImageMode::Overlay => write!(f, "overlay"),
        }
    }
}

/// Substitute image settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Directory scanned once at startup for substitute images.
    pub folder: PathBuf,

    /// Substitution or overlay.
    pub mode: ImageMode,

    /// Path prefix (case-insensitive) that triggers image handling.
    pub path_prefix: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("memes"),
            mode: ImageMode::Substitute,
            path_prefix: "/image".to_string(),
        }
    }
}

/// Easter-egg configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EasterEggConfig {
    /// Hostname (case-insensitive) that gets the easter-egg page.
    pub trigger_host: String,
}

impl Default for EasterEggConfig {
    fn default() -> Self {
        Self {
            trigger_host: "google.ca".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Per-read idle timeout in seconds for client and upstream sockets. Zero disables.
    pub idle_secs: u64,

    /// How long in-flight connections may drain after shutdown is signalled.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            idle_secs: 60,
            shutdown_grace_secs: 5,
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    /// `None` when idle timeouts are disabled.
    pub fn idle(&self) -> Option<Duration> {
        (self.idle_secs > 0).then(|| Duration::from_secs(self.idle_secs))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub log_filter: String,

    /// Human-oriented or single-line output.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address the scrape endpoint listens on.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "meme_proxy=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
