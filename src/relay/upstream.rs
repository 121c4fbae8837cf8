//! Outbound connections to origin servers.

use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::relay::UpstreamError;

/// Connect to `authority` (`host:port`) within `connect_timeout` and send `request` verbatim.
pub async fn open(
    authority: &str,
    request: &[u8],
    connect_timeout: Duration,
) -> Result<TcpStream, UpstreamError> {
    let mut stream = match tokio::time::timeout(connect_timeout, TcpStream::connect(authority)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => {
            return Err(UpstreamError::Connect {
                authority: authority.to_string(),
                source,
            })
        }
        Err(_) => {
            return Err(UpstreamError::ConnectTimeout {
                authority: authority.to_string(),
                timeout: connect_timeout,
            })
        }
    };

    stream.write_all(request).await.map_err(UpstreamError::Send)?;
    stream.flush().await.map_err(UpstreamError::Send)?;

    tracing::debug!(upstream = %authority, bytes = request.len(), "Request forwarded upstream");
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn forwards_request_bytes_verbatim() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let raw = b"GET http://example.com/foo HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let stream = open(&addr.to_string(), raw, Duration::from_secs(1)).await.unwrap();
        drop(stream);

        assert_eq!(server.await.unwrap(), raw.to_vec());
    }

    #[tokio::test]
    async fn refused_connection_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = open(&addr.to_string(), b"GET / HTTP/1.1\r\n\r\n", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Connect { .. }));
        assert_eq!(err.kind(), "connect");
    }
}
