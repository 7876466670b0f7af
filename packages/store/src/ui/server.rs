//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use michi_shared::config::{INGEST_PATH, WEBSOCKET_PATH};
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    BroadcastLatestStateUseCase, ConnectSubscriberUseCase, DisconnectSubscriberUseCase,
    IngestBatchUseCase,
};

use super::{
    driver::spawn_broadcast_driver,
    handler::{health_check, ingest_batch, latest_state, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Default period of the broadcast driver
pub const DEFAULT_BROADCAST_INTERVAL: Duration = Duration::from_secs(1);

/// Telemetry store server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     ingest_batch_usecase,
///     broadcast_latest_usecase,
///     connect_subscriber_usecase,
///     disconnect_subscriber_usecase,
/// );
/// server.run("0.0.0.0".to_string(), 8000).await?;
/// ```
pub struct Server {
    ingest_batch_usecase: Arc<IngestBatchUseCase>,
    broadcast_latest_usecase: Arc<BroadcastLatestStateUseCase>,
    connect_subscriber_usecase: Arc<ConnectSubscriberUseCase>,
    disconnect_subscriber_usecase: Arc<DisconnectSubscriberUseCase>,
    broadcast_interval: Duration,
}

impl Server {
    pub fn new(
        ingest_batch_usecase: Arc<IngestBatchUseCase>,
        broadcast_latest_usecase: Arc<BroadcastLatestStateUseCase>,
        connect_subscriber_usecase: Arc<ConnectSubscriberUseCase>,
        disconnect_subscriber_usecase: Arc<DisconnectSubscriberUseCase>,
    ) -> Self {
        Self {
            ingest_batch_usecase,
            broadcast_latest_usecase,
            connect_subscriber_usecase,
            disconnect_subscriber_usecase,
            broadcast_interval: DEFAULT_BROADCAST_INTERVAL,
        }
    }

    /// Set the period of the broadcast driver
    pub fn with_broadcast_interval(mut self, broadcast_interval: Duration) -> Self {
        self.broadcast_interval = broadcast_interval;
        self
    }

    /// Build the router
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            ingest_batch_usecase: self.ingest_batch_usecase.clone(),
            broadcast_latest_usecase: self.broadcast_latest_usecase.clone(),
            connect_subscriber_usecase: self.connect_subscriber_usecase.clone(),
            disconnect_subscriber_usecase: self.disconnect_subscriber_usecase.clone(),
        });

        let websocket_path_no_slash = WEBSOCKET_PATH.trim_end_matches('/');

        Router::new()
            // WebSocket エンドポイント
            .route(WEBSOCKET_PATH, get(websocket_handler))
            .route(websocket_path_no_slash, get(websocket_handler))
            // HTTP エンドポイント
            .route(INGEST_PATH, post(ingest_batch))
            .route("/api/health", get(health_check))
            .route("/api/latest", get(latest_state))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the server until Ctrl+C
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Telemetry store listening on {}", listener.local_addr()?);
        tracing::info!("Ingest: POST http://{}{}", bind_addr, INGEST_PATH);
        tracing::info!("Stream: ws://{}{}", bind_addr, WEBSOCKET_PATH);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// The broadcast driver runs for as long as the server does.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let shutdown_tx = Arc::new(shutdown_tx);
        let driver = spawn_broadcast_driver(
            self.broadcast_latest_usecase.clone(),
            self.broadcast_interval,
            shutdown_rx,
        );

        let app = self.router();
        let signal_tx = shutdown_tx.clone();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                let _ = signal_tx.send(true);
            })
            .await;

        let _ = shutdown_tx.send(true);
        if let Err(e) = driver.await {
            tracing::warn!("Broadcast driver ended abnormally: {}", e);
        }

        result
    }
}
