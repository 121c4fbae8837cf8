//! Per-route request handlers.
//!
//! # Handlers
//! - `easter_egg`: HTML page with an embedded pool image (trigger hostname)
//! - `meme_image`: a pool image in place of the requested one
//! - `image_overlay`: the origin image with a pool image over its top half
//! - `forward`: the origin response, relayed in paced chunks
//!
//! # Failure Policy
//! - Empty pool → 404 (easter egg, meme image) or original response (overlay)
//! - Unreadable pool file → 500 (easter egg, meme image) or original response (overlay)
//! - Unreachable origin → 502
//! - Missing origin host → close without a response
//! - Client write failure → give up on the connection

pub mod easter_egg;
pub mod forward;
pub mod image_overlay;
pub mod meme_image;

use thiserror::Error;

use crate::relay::UpstreamError;

/// A failure that ended a connection early. Already answered where possible.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("client write failed: {0}")]
    Client(#[from] std::io::Error),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl HandlerError {
    /// Metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::Client(_) => "client_write",
            HandlerError::Upstream(e) => e.kind(),
        }
    }
}
