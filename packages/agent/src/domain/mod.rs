//! Domain layer: road-surface classification and the ports the pipeline depends on.

pub mod classifier;
pub mod error;
pub mod source;
pub mod transmitter;

pub use classifier::{ClassifierState, RoadSurfaceClassifier};
pub use error::ReplayError;
pub use source::SampleSource;
pub use transmitter::BatchTransmitter;
