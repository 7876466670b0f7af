//! Infrastructure layer: file-backed replay source and the HTTP transmitter.

pub mod replay;
pub mod transmitter;

pub use replay::ReplaySource;
pub use transmitter::HttpBatchTransmitter;
