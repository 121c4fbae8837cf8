//! Plain forwarding with paced relay of the origin's response.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::handlers::HandlerError;
use crate::http::response;
use crate::http::server::AppState;
use crate::http::ProxyRequest;
use crate::relay::{paced, upstream, Pacing};

pub async fn serve<C>(client: &mut C, request: &ProxyRequest, state: &AppState) -> Result<(), HandlerError>
where
    C: AsyncWrite + Unpin,
{
    let Some(authority) = request.authority() else {
        tracing::debug!(uri = %request.target(), "No upstream host; closing");
        return Ok(());
    };

    let mut origin = match upstream::open(&authority, request.raw(), state.timeouts.connect()).await {
        Ok(stream) => stream,
        Err(e) => {
            client.write_all(&response::bad_gateway()).await?;
            return Err(e.into());
        }
    };

    let pacing = Pacing {
        chunk_size: state.relay.chunk_size,
        delay: state.relay.chunk_delay(),
        idle: state.timeouts.idle(),
    };
    let relayed = paced::relay(&mut origin, client, pacing).await?;

    tracing::debug!(upstream = %authority, bytes = relayed, "Forward complete");
    Ok(())
}
