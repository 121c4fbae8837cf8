//! Response relay subsystem.
//!
//! # Data Flow
//! ```text
//! upstream.rs: connect (bounded) → write original request bytes
//!
//! Mode A (plain forward):
//!     paced.rs: read chunk → write chunk → sleep → ... → upstream EOF
//!
//! Mode B (intercept and transform):
//!     buffered.rs: read until upstream EOF → BytesMut
//!     → split head/body → transform body → rewrite head → single write
//! ```
//!
//! # Design Decisions
//! - No keep-alive: one request per upstream connection, EOF ends the response
//! - No chunked-encoding awareness; bytes are relayed as they arrive
//! - Sockets are owned by the connection task and closed on drop

pub mod buffered;
pub mod paced;
pub mod upstream;

use std::time::Duration;
use thiserror::Error;

pub use paced::Pacing;

/// Failures talking to an origin server, or writing its response back.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to connect to {authority}: {source}")]
    Connect {
        authority: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connecting to {authority} timed out after {timeout:?}")]
    ConnectTimeout { authority: String, timeout: Duration },

    #[error("failed to send request upstream: {0}")]
    Send(#[source] std::io::Error),

    #[error("failed to read upstream response: {0}")]
    Read(#[source] std::io::Error),

    #[error("client went away during relay: {0}")]
    ClientGone(#[source] std::io::Error),
}

impl UpstreamError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Connect { .. } => "connect",
            UpstreamError::ConnectTimeout { .. } => "connect_timeout",
            UpstreamError::Send(_) => "send",
            UpstreamError::Read(_) => "read",
            UpstreamError::ClientGone(_) => "client_gone",
        }
    }

    /// Whether the origin could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            UpstreamError::Connect { .. } | UpstreamError::ConnectTimeout { .. }
        )
    }
}
