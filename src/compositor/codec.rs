//! Codec abstraction and its `image`-crate implementation.

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageFormat};
use std::io::Cursor;

use crate::compositor::CompositeError;

/// Format used when the original encoding is unknown or cannot be written.
pub const FALLBACK_FORMAT: &str = "png";

/// A decoded image and the format it was stored in, when known.
#[derive(Debug, Clone)]
pub struct Decoded<I> {
    pub image: I,
    /// Lowercase format name (`png`, `jpg`, `gif`, `webp`, ...).
    pub format: Option<&'static str>,
}

/// The operations the compositor needs from an image library.
pub trait ImageCodec: Send + Sync + 'static {
    type Image: Send;

    fn decode(&self, bytes: &[u8]) -> Result<Decoded<Self::Image>, CompositeError>;

    fn dimensions(&self, image: &Self::Image) -> (u32, u32);

    fn resize(&self, image: &Self::Image, width: u32, height: u32) -> Self::Image;

    /// Overwrite the top-left region of `base` with `overlay`, in an alpha-capable pixel format.
    fn composite_top(&self, base: Self::Image, overlay: &Self::Image) -> Self::Image;

    /// Encode as `format`, returning the bytes and the format actually used.
    fn encode(&self, image: &Self::Image, format: &str) -> Result<(Vec<u8>, &'static str), CompositeError>;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterCodec;

fn format_name(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or(FALLBACK_FORMAT)
}

fn write_as(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ImageError> {
    // JPEG carries no alpha channel.
    let flattened;
    let source = if format == ImageFormat::Jpeg {
        flattened = DynamicImage::ImageRgb8(image.to_rgb8());
        &flattened
    } else {
        image
    };

    let mut out = Cursor::new(Vec::new());
    source.write_to(&mut out, format)?;
    Ok(out.into_inner())
}

impl ImageCodec for RasterCodec {
    type Image = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<Decoded<DynamicImage>, CompositeError> {
        let format = image::guess_format(bytes).map_err(|e| CompositeError::Decode(e.to_string()))?;
        let image = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| CompositeError::Decode(e.to_string()))?;
        Ok(Decoded {
            image,
            format: Some(format_name(format)),
        })
    }

    fn dimensions(&self, image: &DynamicImage) -> (u32, u32) {
        (image.width(), image.height())
    }

    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize_exact(width, height, FilterType::Triangle)
    }

    fn composite_top(&self, base: DynamicImage, overlay: &DynamicImage) -> DynamicImage {
        let mut base = base.into_rgba8();
        let overlay = overlay.to_rgba8();
        imageops::replace(&mut base, &overlay, 0, 0);
        DynamicImage::ImageRgba8(base)
    }

    fn encode(&self, image: &DynamicImage, format: &str) -> Result<(Vec<u8>, &'static str), CompositeError> {
        if let Some(target) = ImageFormat::from_extension(format) {
            match write_as(image, target) {
                Ok(bytes) => return Ok((bytes, format_name(target))),
                Err(ImageError::Unsupported(e)) => {
                    tracing::debug!(format, error = %e, "No encoder for original format; using fallback");
                }
                Err(e) => return Err(CompositeError::Encode(e.to_string())),
            }
        }

        write_as(image, ImageFormat::Png)
            .map(|bytes| (bytes, FALLBACK_FORMAT))
            .map_err(|e| CompositeError::Encode(e.to_string()))
    }
}
