//! HTML page embedding a pool image, served for the trigger hostname.

use base64::{engine::general_purpose, Engine as _};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response;
use crate::pool::ImagePool;

/// Build the page for an image of type `mime`.
pub fn render_page(mime: &str, image: &[u8]) -> String {
    let encoded = general_purpose::STANDARD.encode(image);
    format!(
        r#"<html>
<head>
    <title>Surprise!</title>
    <meta charset="utf-8">
</head>
<body>
    <img src="data:{mime};base64,{encoded}" style="width:100vw; height:auto; object-fit:cover;" alt="Easter Egg Meme"/>
</body>
</html>
"#
    )
}

async fn build_response(pool: &ImagePool) -> Vec<u8> {
    let entry = match pool.choose() {
        Ok(entry) => entry,
        Err(_) => return response::not_found(),
    };

    match entry.read().await {
        Ok(bytes) => {
            let page = render_page(entry.mime(), &bytes);
            response::ok("text/html", page.into_bytes())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read easter-egg image");
            response::internal_error()
        }
    }
}

/// Answer with the easter-egg page: 200 with HTML, 404 on an empty pool, 500 on read failure.
pub async fn serve<C>(client: &mut C, pool: &ImagePool) -> std::io::Result<()>
where
    C: AsyncWrite + Unpin,
{
    let reply = build_response(pool).await;
    client.write_all(&reply).await?;
    client.flush().await
}
