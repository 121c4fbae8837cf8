//! Chunked, throttled streaming of an upstream response to the client.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::observability::metrics;
use crate::relay::UpstreamError;
use crate::resilience::timeouts::with_idle_timeout;

/// How a forwarded response is paced.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    /// Maximum bytes per upstream read / client write.
    pub chunk_size: usize,
    /// Sleep after every chunk written. Zero disables throttling.
    pub delay: Duration,
    /// Per-read idle limit on the upstream side.
    pub idle: Option<Duration>,
}

/// Copy `upstream` to `client` chunk by chunk until upstream reaches EOF.
///
/// Returns the number of bytes relayed. Bytes reach the client in the order
/// upstream produced them.
pub async fn relay<U, C>(upstream: &mut U, client: &mut C, pacing: Pacing) -> Result<u64, UpstreamError>
where
    U: AsyncRead + Unpin,
    C: AsyncWrite + Unpin,
{
    let mut chunk = vec![0u8; pacing.chunk_size.max(1)];
    let mut relayed = 0u64;

    loop {
        let n = match with_idle_timeout(pacing.idle, upstream.read(&mut chunk)).await {
            Ok(n) => n,
            // A keep-alive origin never closes; going idle after data ends the response.
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut && relayed > 0 => {
                tracing::debug!(bytes = relayed, "Upstream went idle; relay finished");
                return Ok(relayed);
            }
            Err(e) => return Err(UpstreamError::Read(e)),
        };
        if n == 0 {
            break;
        }

        client
            .write_all(&chunk[..n])
            .await
            .map_err(UpstreamError::ClientGone)?;
        client.flush().await.map_err(UpstreamError::ClientGone)?;
        relayed += n as u64;
        metrics::record_relayed_bytes(n);

        if !pacing.delay.is_zero() {
            tokio::time::sleep(pacing.delay).await;
        }
    }

    tracing::debug!(bytes = relayed, "Upstream closed; relay finished");
    Ok(relayed)
}
