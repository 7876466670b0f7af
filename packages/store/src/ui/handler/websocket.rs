//! WebSocket connection handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionState, SubscriberId},
    ui::state::AppState,
};

/// Longest a single socket write may take before the subscriber is treated as failed
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn advance(current: ConnectionState, next: ConnectionState, id: &SubscriberId) -> ConnectionState {
    match current.transition(next) {
        Ok(state) => {
            tracing::debug!("Subscriber '{}': {:?} -> {:?}", id, current, state);
            state
        }
        Err(e) => {
            tracing::warn!("Subscriber '{}': {}", id, e);
            current
        }
    }
}

/// Spawns the writer task for one subscriber.
///
/// Drains the subscriber's queue into the socket. Returns `true` if a write failed or timed out,
/// `false` if the queue was closed.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    id: SubscriberId,
) -> tokio::task::JoinHandle<bool> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match tokio::time::timeout(SEND_TIMEOUT, sender.send(Message::Text(msg.into()))).await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!("Failed to write to subscriber '{}': {}", id, e);
                    return true;
                }
                Err(_) => {
                    tracing::warn!(
                        "Write to subscriber '{}' timed out after {:?}",
                        id,
                        SEND_TIMEOUT
                    );
                    return true;
                }
            }
        }
        false
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let mut connection = ConnectionState::Connecting;
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let id = state.connect_subscriber_usecase.execute(tx).await;
    connection = advance(connection, ConnectionState::Open, &id);
    tracing::info!("Subscriber '{}' connected", id);

    // Subscribers only listen; inbound frames are read to notice close and errors
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::debug!("Subscriber '{}' requested close", id);
                    return false;
                }
                Ok(Message::Ping(_)) => tracing::trace!("Received ping"),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("WebSocket error from subscriber '{}': {}", id, e);
                    return true;
                }
            }
        }
        false
    });

    let mut send_task = pusher_loop(rx, sender, id);

    // If any one of the tasks completes, abort the other
    let failed = tokio::select! {
        result = &mut recv_task => {
            send_task.abort();
            matches!(result, Ok(true))
        }
        result = &mut send_task => {
            recv_task.abort();
            matches!(result, Ok(true))
        }
    };

    let next = if failed {
        ConnectionState::Failed
    } else {
        ConnectionState::Closing
    };
    connection = advance(connection, next, &id);
    if !connection.is_terminal() {
        tracing::warn!(
            "Subscriber '{}' left in non-terminal state {:?}",
            id,
            connection
        );
    }

    let removed = state.disconnect_subscriber_usecase.execute(&id).await;
    tracing::info!(
        "Subscriber '{}' disconnected ({:?}{})",
        id,
        connection,
        if removed { "" } else { ", already pruned" }
    );
}
