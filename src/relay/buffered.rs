//! Full buffering of an upstream response for body transformation.

use bytes::BytesMut;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::relay::UpstreamError;
use crate::resilience::timeouts::with_idle_timeout;

const READ_CHUNK: usize = 8 * 1024;

/// Read `upstream` until it closes. Each individual read is bounded by `idle`.
///
/// An origin that answers and then holds the connection open (keep-alive) ends
/// the response at the idle deadline: whatever was buffered is returned. An idle
/// deadline before the first byte is an error.
pub async fn read_to_end<U>(upstream: &mut U, idle: Option<Duration>) -> Result<BytesMut, UpstreamError>
where
    U: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(READ_CHUNK);
    loop {
        buffer.reserve(READ_CHUNK);
        let n = match with_idle_timeout(idle, upstream.read_buf(&mut buffer)).await {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::TimedOut && !buffer.is_empty() => {
                tracing::debug!(bytes = buffer.len(), "Upstream went idle; treating response as complete");
                break;
            }
            Err(e) => return Err(UpstreamError::Read(e)),
        };
        if n == 0 {
            break;
        }
    }

    tracing::debug!(bytes = buffer.len(), "Upstream response buffered");
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn drains_until_close() {
        let (mut upstream, mut origin) = tokio::io::duplex(1024);
        let payload: Vec<u8> = (0..40_000u32).map(|i| (i % 7) as u8).collect();
        let expected = payload.clone();
        tokio::spawn(async move {
            for piece in payload.chunks(333) {
                origin.write_all(piece).await.unwrap();
            }
        });

        let buffered = read_to_end(&mut upstream, Some(Duration::from_secs(5))).await.unwrap();
        assert_eq!(&buffered[..], &expected[..]);
    }

    #[tokio::test]
    async fn idle_after_data_returns_what_arrived() {
        let (mut upstream, mut origin) = tokio::io::duplex(1024);
        origin.write_all(b"HTTP/1.1 200 OK\r\n\r\nbody").await.unwrap();

        let buffered = read_to_end(&mut upstream, Some(Duration::from_millis(50))).await.unwrap();
        assert_eq!(&buffered[..], b"HTTP/1.1 200 OK\r\n\r\nbody");
        drop(origin);
    }

    #[tokio::test]
    async fn idle_before_any_data_is_an_error() {
        let (mut upstream, _origin) = tokio::io::duplex(1024);
        let err = read_to_end(&mut upstream, Some(Duration::from_millis(20))).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Read(ref e) if e.kind() == ErrorKind::TimedOut));
    }

    #[tokio::test]
    async fn empty_upstream_is_empty_buffer() {
        let mut upstream: &[u8] = &[];
        let buffered = read_to_end(&mut upstream, None).await.unwrap();
        assert!(buffered.is_empty());
    }
}
