//! Telemetry agent.
//!
//! Replays recorded accelerometer and GPS logs as an endless stream, classifies the road surface
//! and posts classified batches to the store.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin michi-agent
//! cargo run --bin michi-agent -- --accelerometer-file data/accelerometer.csv --gps-file data/gps.csv
//! STORE_HOST=store.example.com STORE_PORT=443 cargo run --bin michi-agent
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use michi_agent::{
    infrastructure::{HttpBatchTransmitter, ReplaySource},
    usecase::TelemetryPipeline,
};
use michi_shared::{
    config::{DEFAULT_STORE_HOST, DEFAULT_STORE_PORT, Endpoint, STORE_HOST_ENV, STORE_PORT_ENV},
    logger::setup_logger,
    time::SystemClock,
};
use tokio::sync::watch;

#[derive(Parser, Debug)]
#[command(name = "michi-agent")]
#[command(about = "Replays sensor logs, classifies the road surface and ships batches to the store", long_about = None)]
struct Args {
    /// Store host
    #[arg(short = 'H', long, env = STORE_HOST_ENV, default_value = DEFAULT_STORE_HOST)]
    store_host: String,

    /// Store port
    #[arg(short = 'p', long, env = STORE_PORT_ENV, default_value_t = DEFAULT_STORE_PORT)]
    store_port: u16,

    /// Accelerometer log (CSV with x,y,z columns)
    #[arg(long, env = "ACCELEROMETER_FILE", default_value = "data/accelerometer.csv")]
    accelerometer_file: String,

    /// GPS log (CSV with latitude,longitude columns)
    #[arg(long, env = "GPS_FILE", default_value = "data/gps.csv")]
    gps_file: String,

    /// User ID attached to every sample
    #[arg(short = 'u', long, env = "USER_ID", default_value_t = 1)]
    user_id: i64,

    /// Number of classified samples per batch
    #[arg(short = 'b', long, env = "BATCH_SIZE", default_value_t = 5)]
    batch_size: usize,

    /// Delay between two samples in milliseconds
    #[arg(short = 'd', long, env = "DELAY_MS", default_value_t = 100)]
    delay_ms: u64,

    /// Timeout of one delivery attempt in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Agent error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = Endpoint::new(args.store_host, args.store_port);

    // 1. Replay source
    let mut source = ReplaySource::new(
        args.accelerometer_file,
        args.gps_file,
        Arc::new(SystemClock),
        args.user_id,
    );
    source.open()?;

    // 2. Transmitter
    let transmitter = Arc::new(HttpBatchTransmitter::new(
        &endpoint.http_base_url(),
        Duration::from_secs(args.request_timeout_secs),
    )?);
    tracing::info!("Sending batches to {}", transmitter.url());

    // 3. Shutdown on Ctrl+C
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

    // 4. Pipeline
    let mut pipeline = TelemetryPipeline::new(source, transmitter, args.batch_size);
    let result = pipeline
        .run(Duration::from_millis(args.delay_ms), shutdown_rx)
        .await;

    let mut source = pipeline.into_source();
    source.close();

    let stats = result?;
    tracing::info!(
        "Processed {} samples ({} potholes, {} bumps), {} batches sent, {} failed",
        stats.samples,
        stats.potholes,
        stats.bumps,
        stats.batches_sent,
        stats.batches_failed
    );

    Ok(())
}
