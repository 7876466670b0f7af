//! Telemetry store.
//!
//! Ingests classified batches from agents and streams the latest road state to every connected
//! map client, once per tick and right after each ingest.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin michi-store
//! cargo run --bin michi-store -- --host 127.0.0.1 --port 3000 --broadcast-interval-ms 500
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use michi_shared::{
    config::{DEFAULT_STORE_PORT, STORE_HOST_ENV, STORE_PORT_ENV},
    logger::setup_logger,
};
use michi_store::{
    infrastructure::{
        message_pusher::WebSocketSubscriberRegistry,
        repository::{InMemoryTelemetryRepository, inmemory::DEFAULT_MAX_RECORDS},
    },
    ui::Server,
    usecase::{
        BroadcastLatestStateUseCase, ConnectSubscriberUseCase, DisconnectSubscriberUseCase,
        IngestBatchUseCase,
    },
};

#[derive(Parser, Debug)]
#[command(name = "michi-store")]
#[command(about = "Telemetry store with live WebSocket broadcast", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = STORE_HOST_ENV, default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = STORE_PORT_ENV, default_value_t = DEFAULT_STORE_PORT)]
    port: u16,

    /// Period of the latest-state broadcast in milliseconds
    #[arg(short = 'i', long, env = "BROADCAST_INTERVAL_MS", default_value_t = 1000)]
    broadcast_interval_ms: u64,

    /// Records kept in memory before the oldest are dropped
    #[arg(long, env = "STORE_MAX_RECORDS", default_value_t = DEFAULT_MAX_RECORDS)]
    max_records: usize,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // 1. Create Repository (in-memory database)
    let repository = Arc::new(InMemoryTelemetryRepository::with_capacity(args.max_records));

    // 2. Create SubscriberRegistry (WebSocket implementation)
    let registry = Arc::new(WebSocketSubscriberRegistry::new());

    // 3. Create UseCases
    let ingest_batch_usecase = Arc::new(IngestBatchUseCase::new(
        repository.clone(),
        registry.clone(),
    ));
    let broadcast_latest_usecase = Arc::new(BroadcastLatestStateUseCase::new(
        repository.clone(),
        registry.clone(),
    ));
    let connect_subscriber_usecase = Arc::new(ConnectSubscriberUseCase::new(registry.clone()));
    let disconnect_subscriber_usecase = Arc::new(DisconnectSubscriberUseCase::new(registry));

    // 4. Create and run the server
    let server = Server::new(
        ingest_batch_usecase,
        broadcast_latest_usecase,
        connect_subscriber_usecase,
        disconnect_subscriber_usecase,
    )
    .with_broadcast_interval(Duration::from_millis(args.broadcast_interval_ms.max(1)));

    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
