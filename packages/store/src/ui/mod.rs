//! Telemetry store server: HTTP ingest, WebSocket stream and the periodic broadcast driver.

mod driver;
mod handler;
mod server;
mod signal;
pub mod state;

pub use driver::spawn_broadcast_driver;
pub use server::Server;
pub use signal::shutdown_signal;
