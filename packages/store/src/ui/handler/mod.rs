//! Request handlers.

mod http;
mod websocket;

pub use http::{health_check, ingest_batch, latest_state};
pub use websocket::websocket_handler;
