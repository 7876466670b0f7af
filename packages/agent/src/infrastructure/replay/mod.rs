//! Replay of recorded sensor logs.
//!
//! - `sensor_log`: CSV parsing into typed rows
//! - `file_source`: endless, independently looping cursors over the parsed rows

mod file_source;
mod sensor_log;

pub use file_source::ReplaySource;
pub use sensor_log::{LogRecord, parse_log};
