//! Telemetry store library.
//!
//! Ingests classified telemetry batches, keeps the latest road state, and streams it to an
//! open-ended set of WebSocket subscribers, both on a fixed tick and right after each ingest.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
