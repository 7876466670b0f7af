//! Live map client.
//!
//! Follows the store's WebSocket stream and prints the vehicle trail and road anomalies as they
//! arrive. Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin michi-mapview
//! STORE_HOST=store.example.com STORE_PORT=443 cargo run --bin michi-mapview
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use michi_mapview::{PointBuffer, ReconnectPolicy, formatter::TrailFormatter, runner};
use michi_shared::{
    config::{DEFAULT_STORE_HOST, DEFAULT_STORE_PORT, Endpoint, STORE_HOST_ENV, STORE_PORT_ENV},
    logger::setup_logger,
};
use tokio::sync::watch;

#[derive(Parser, Debug)]
#[command(name = "michi-mapview")]
#[command(about = "Live map client for the telemetry store", long_about = None)]
struct Args {
    /// Store host
    #[arg(short = 'H', long, env = STORE_HOST_ENV, default_value = DEFAULT_STORE_HOST)]
    store_host: String,

    /// Store port
    #[arg(short = 'p', long, env = STORE_PORT_ENV, default_value_t = DEFAULT_STORE_PORT)]
    store_port: u16,

    /// Period of the display update in milliseconds
    #[arg(short = 'i', long, env = "DRAIN_INTERVAL_MS", default_value_t = 1000)]
    drain_interval_ms: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let url = Endpoint::new(args.store_host, args.store_port).websocket_url();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl+C, stopping...");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                tracing::warn!("Failed to listen for Ctrl+C: {}", e);
                shutdown_tx.closed().await;
            }
        }
    });

    let buffer = Arc::new(PointBuffer::new());
    let drain = runner::spawn_drain_loop(
        buffer.clone(),
        Duration::from_millis(args.drain_interval_ms.max(1)),
        shutdown_rx.clone(),
    );

    let result = runner::run_client(&url, buffer, ReconnectPolicy::default(), shutdown_rx).await;

    // The drain loop only stops on Ctrl+C, so do not wait for it after a fatal error
    if let Err(e) = result {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }

    match drain.await {
        Ok(view) => println!("{}", TrailFormatter::format_update(&view, 0)),
        Err(e) => tracing::warn!("Drain loop ended abnormally: {}", e),
    }
}
