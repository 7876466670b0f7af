//! UseCase layer: the sequential producer loop.

pub mod stream_telemetry;

pub use stream_telemetry::{PipelineStats, TelemetryPipeline};
