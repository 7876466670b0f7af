//! Telemetry agent library.
//!
//! Replays recorded accelerometer/GPS logs as an endless stream, classifies the road surface
//! sample by sample and ships classified batches to the store.

// layers
pub mod domain;
pub mod infrastructure;
pub mod usecase;
