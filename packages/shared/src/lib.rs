//! Shared building blocks for the Michi telemetry pipeline.
//!
//! Everything that crosses a process boundary lives here: the telemetry data model and its wire
//! shape, ISO-8601 time handling, endpoint configuration and logging setup.

pub mod config;
pub mod display;
pub mod error;
pub mod logger;
pub mod telemetry;
pub mod time;

pub use display::DisplayUpdate;
pub use error::{InputKind, MalformedInputError};
pub use telemetry::{Accelerometer, ClassifiedSample, Gps, RoadState, Sample};
