//! WebSocket client session management.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, protocol::Message},
};

use crate::{buffer::PointBuffer, domain::decode_frame, error::ClientError};

/// Run one session: connect, then stage every display update until the connection ends.
///
/// Returns `Ok(())` only when `shutdown` flips to `true`.
pub async fn run_session(
    url: &str,
    buffer: Arc<PointBuffer>,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url).await.map_err(|e| match e {
        WsError::Url(e) => ClientError::InvalidUrl(format!("{}: {}", url, e)),
        other => ClientError::ConnectionError(other.to_string()),
    })?;

    tracing::info!("Connected to {}, waiting for data...", url);

    let (_write, mut read) = ws_stream.split();

    loop {
        let message = tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::info!("Closing session");
                    return Ok(());
                }
                continue;
            }
            message = read.next() => message,
        };

        match message {
            Some(Ok(Message::Text(text))) => {
                tracing::debug!("Raw data received: {}", text.as_str());
                match decode_frame(text.as_str()) {
                    Ok(Some(point)) => buffer.push(point).await,
                    Ok(None) => tracing::trace!("Skipping empty frame"),
                    Err(e) => tracing::warn!("Skipping frame: {}", e),
                }
            }
            Some(Ok(Message::Binary(data))) => {
                tracing::debug!("Ignoring binary frame ({} bytes)", data.len());
            }
            Some(Ok(Message::Close(_))) => {
                return Err(ClientError::Disconnected(
                    "server closed the connection".to_string(),
                ));
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(ClientError::Disconnected(e.to_string())),
            None => {
                return Err(ClientError::Disconnected("stream ended".to_string()));
            }
        }
    }
}
