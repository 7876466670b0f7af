//! Batch delivery implementations.
//!
//! - `http`: JSON over HTTP POST to the store's ingest endpoint

pub mod http;

pub use http::{HttpBatchTransmitter, TransportError};
