//! Overlay: fetch the origin image, paint a pool image over its top half, return it.

use bytes::Bytes;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::compositor::{Composited, Compositor};
use crate::handlers::HandlerError;
use crate::http::response::{self, split_head_body};
use crate::http::server::AppState;
use crate::http::ProxyRequest;
use crate::observability::metrics;
use crate::pool::ImagePool;
use crate::relay::{buffered, upstream};

/// Transform a fully buffered upstream response.
///
/// Falls back to the original bytes when the response has no header/body
/// delimiter, the pool is empty, or the body cannot be composited.
pub async fn transform_response(original: Bytes, pool: &ImagePool, compositor: &Arc<Compositor>) -> Bytes {
    let Some((head, body)) = split_head_body(&original) else {
        tracing::debug!("Upstream response has no header delimiter; forwarding as-is");
        return original;
    };

    let substitute = match pool.choose() {
        Ok(entry) => match entry.read().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read overlay image; forwarding original");
                return original;
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "No overlay image; forwarding original");
            return original;
        }
    };

    let body = original.slice_ref(body);
    let worker = Arc::clone(compositor);
    let composited = tokio::task::spawn_blocking(move || worker.overlay(&body, &substitute)).await;

    match composited {
        Ok(Ok(Composited { bytes, format })) => {
            tracing::debug!(format, bytes = bytes.len(), "Upstream image composited");
            metrics::record_image_rewritten();
            Bytes::from(response::assemble(head, &bytes, format))
        }
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Body not transformable; forwarding original");
            original
        }
        Err(e) => {
            tracing::error!(error = %e, "Compositor task failed; forwarding original");
            original
        }
    }
}

pub async fn serve<C>(client: &mut C, request: &ProxyRequest, state: &AppState) -> Result<(), HandlerError>
where
    C: AsyncWrite + Unpin,
{
    let Some(authority) = request.authority() else {
        tracing::debug!(uri = %request.target(), "No upstream host for image request; closing");
        return Ok(());
    };

    let mut origin = match upstream::open(&authority, request.raw(), state.timeouts.connect()).await {
        Ok(stream) => stream,
        Err(e) => {
            client.write_all(&response::bad_gateway()).await?;
            return Err(e.into());
        }
    };

    let buffered = buffered::read_to_end(&mut origin, state.timeouts.idle()).await?;
    drop(origin);

    let reply = transform_response(buffered.freeze(), &state.pool, &state.compositor).await;
    client.write_all(&reply).await?;
    client.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([9, 9, 9, 255])))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn with_body(head: &str, body: &[u8]) -> Bytes {
        let mut raw = head.as_bytes().to_vec();
        raw.extend_from_slice(b"\r\n\r\n");
        raw.extend_from_slice(body);
        Bytes::from(raw)
    }

    #[tokio::test]
    async fn missing_delimiter_passes_through() {
        let compositor = Arc::new(Compositor::default());
        let raw = Bytes::from_static(b"HTTP/1.1 200 OK\r\nContent-Length: 3");
        let out = transform_response(raw.clone(), &ImagePool::default(), &compositor).await;
        assert_eq!(out, raw);
    }

    #[tokio::test]
    async fn empty_pool_passes_through() {
        let compositor = Arc::new(Compositor::default());
        let raw = with_body("HTTP/1.1 200 OK\r\nContent-Type: image/png", &png(4, 4));
        let out = transform_response(raw.clone(), &ImagePool::default(), &compositor).await;
        assert_eq!(out, raw);
    }

    #[tokio::test]
    async fn composites_and_rewrites_headers() {
        let meme = std::env::temp_dir().join(format!("meme-proxy-overlay-{}.png", std::process::id()));
        std::fs::write(&meme, png(2, 2)).unwrap();
        let pool = ImagePool::from_paths([meme.clone()]);
        let compositor = Arc::new(Compositor::default());

        let raw = with_body(
            "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 1\r\nX-Origin: yes",
            &png(10, 8),
        );
        let out = transform_response(raw.clone(), &pool, &compositor).await;
        std::fs::remove_file(&meme).unwrap();

        assert_ne!(out, raw);
        let (head, body) = split_head_body(&out).unwrap();
        let head = std::str::from_utf8(head).unwrap();
        assert_eq!(
            head,
            format!(
                "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\nX-Origin: yes",
                body.len()
            )
        );
        let decoded = image::load_from_memory(body).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 8));
    }
}
