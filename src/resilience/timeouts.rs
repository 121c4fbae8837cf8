//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound upstream connection establishment
//! - Bound each individual socket read (idle timeout)
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - An elapsed idle timeout surfaces as `io::ErrorKind::TimedOut`
//! - A `None` idle timeout waits forever

use std::future::Future;
use std::io;
use std::time::Duration;

/// Await `op`, failing with `TimedOut` if `idle` elapses first.
pub async fn with_idle_timeout<T, F>(idle: Option<Duration>, op: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match idle {
        Some(limit) => match tokio::time::timeout(limit, op).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no progress within {:?}", limit),
            )),
        },
        None => op.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_results() {
        let value = with_idle_timeout(Some(Duration::from_secs(1)), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn elapsed_is_timed_out() {
        let err = with_idle_timeout(Some(Duration::from_millis(10)), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn none_waits() {
        let value = with_idle_timeout(None, async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok("done")
        })
        .await
        .unwrap();
        assert_eq!(value, "done");
    }
}
