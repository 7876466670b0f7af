//! Batch transmitter port.

use async_trait::async_trait;
use michi_shared::ClassifiedSample;

/// Delivers classified batches to the store.
///
/// One call is one delivery attempt. `true` means the store acknowledged the batch; `false`
/// covers every transport or protocol failure. Implementations never retry on their own, so a
/// caller that wants the batch delivered must call `send` again with the same batch.
#[async_trait]
pub trait BatchTransmitter: Send + Sync {
    async fn send(&self, batch: &[ClassifiedSample]) -> bool;
}
