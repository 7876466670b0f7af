//! Sample source port.

use michi_shared::Sample;

use super::error::ReplayError;

/// Endless source of telemetry samples.
///
/// `read` takes `&mut self`: a source has exactly one reader at a time.
pub trait SampleSource: Send {
    /// Return the next sample
    fn read(&mut self) -> Result<Sample, ReplayError>;
}
