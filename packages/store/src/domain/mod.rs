//! Domain layer: stored records, subscribers and the ports implemented by infrastructure.

pub mod entity;
pub mod error;
pub mod pusher;
pub mod repository;
pub mod subscriber;

pub use entity::{LatestStateRecord, RecordId, StoredRecord};
pub use error::{MessagePushError, RepositoryError, TransitionError};
pub use pusher::{BroadcastReport, SubscriberRegistry};
pub use repository::TelemetryRepository;
#[cfg(test)]
pub use repository::MockTelemetryRepository;
pub use subscriber::{ConnectionState, PusherChannel, SubscriberId};
