//! Direct substitution: answer image requests with a pool image, never touching the origin.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response;
use crate::pool::ImagePool;

async fn build_response(pool: &ImagePool) -> Vec<u8> {
    let entry = match pool.choose() {
        Ok(entry) => entry,
        Err(_) => return response::not_found(),
    };

    match entry.read().await {
        Ok(bytes) => {
            tracing::debug!(image = ?entry.path(), bytes = bytes.len(), "Serving substitute image");
            response::ok(entry.mime(), bytes)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read substitute image");
            response::internal_error()
        }
    }
}

pub async fn serve<C>(client: &mut C, pool: &ImagePool) -> std::io::Result<()>
where
    C: AsyncWrite + Unpin,
{
    let reply = build_response(pool).await;
    client.write_all(&reply).await?;
    client.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::split_head_body;

    #[tokio::test]
    async fn empty_pool_is_not_found() {
        let mut client = Vec::new();
        serve(&mut client, &ImagePool::default()).await.unwrap();
        assert!(client.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn body_is_the_pool_file() {
        let path = std::env::temp_dir().join(format!("meme-proxy-sub-{}.png", std::process::id()));
        let contents: Vec<u8> = (0..100u8).collect();
        std::fs::write(&path, &contents).unwrap();
        let pool = ImagePool::from_paths([path.clone()]);

        let mut client = Vec::new();
        serve(&mut client, &pool).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let (head, body) = split_head_body(&client).unwrap();
        assert_eq!(
            std::str::from_utf8(head).unwrap(),
            "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 100"
        );
        assert_eq!(body, &contents[..]);
    }

    #[tokio::test]
    async fn unreadable_image_is_server_error() {
        let pool = ImagePool::from_paths(["/no/such/dir/gone.webp"]);
        let mut client = Vec::new();
        serve(&mut client, &pool).await.unwrap();
        assert!(client.starts_with(b"HTTP/1.1 500 Internal Server Error\r\n"));
    }
}
