//! Image compositing.
//!
//! # Data Flow
//! ```text
//! original body bytes ─┐
//!                      ├→ decode both → resize substitute to (W, H/2)
//! substitute bytes ────┘   → composite onto top half → encode (original format)
//!                          → Composited { bytes, format }
//! ```
//!
//! # Design Decisions
//! - The image library sits behind `ImageCodec`; the compositor only sequences calls
//! - Pure and synchronous; callers run it on a blocking thread
//! - Any failure is reported, never panics, so the caller can fall back to the original

pub mod codec;

use thiserror::Error;

pub use codec::{Decoded, ImageCodec, RasterCodec, FALLBACK_FORMAT};

/// Why an overlay could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeError {
    #[error("body is not a decodable image: {0}")]
    Decode(String),

    #[error("substitute image is not decodable: {0}")]
    Substitute(String),

    #[error("image {width}x{height} is too small to cover half of it")]
    TooSmall { width: u32, height: u32 },

    #[error("failed to encode composited image: {0}")]
    Encode(String),
}

/// A re-encoded image.
#[derive(Debug, Clone)]
pub struct Composited {
    pub bytes: Vec<u8>,
    /// Format name the bytes are encoded in.
    pub format: &'static str,
}

/// Paints a substitute image over the top half of an original.
#[derive(Debug, Default, Clone)]
pub struct Compositor<C = RasterCodec> {
    codec: C,
}

impl<C: ImageCodec> Compositor<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// Replace the top half of `original` with `substitute` scaled to fit.
    ///
    /// The result keeps the original's dimensions and, when possible, its format.
    pub fn overlay(&self, original: &[u8], substitute: &[u8]) -> Result<Composited, CompositeError> {
        let base = self.codec.decode(original)?;
        let (width, height) = self.codec.dimensions(&base.image);
        let half_height = height / 2;
        if width == 0 || half_height == 0 {
            return Err(CompositeError::TooSmall { width, height });
        }

        let meme = self.codec.decode(substitute).map_err(|e| match e {
            CompositeError::Decode(msg) => CompositeError::Substitute(msg),
            other => other,
        })?;
        let meme = self.codec.resize(&meme.image, width, half_height);

        let merged = self.codec.composite_top(base.image, &meme);
        let format = base.format.unwrap_or(FALLBACK_FORMAT);
        let (bytes, format) = self.codec.encode(&merged, format)?;

        Ok(Composited { bytes, format })
    }
}
