//! UseCase 層
//!
//! ドメイン層の trait（TelemetryRepository, SubscriberRegistry）だけに依存し、
//! 取り込み・配信・購読者の接続と切断を組み立てます。

pub mod broadcast_latest;
pub mod connect_subscriber;
pub mod disconnect_subscriber;
pub mod error;
pub mod ingest_batch;

pub use broadcast_latest::BroadcastLatestStateUseCase;
pub use connect_subscriber::ConnectSubscriberUseCase;
pub use disconnect_subscriber::DisconnectSubscriberUseCase;
pub use error::{BroadcastError, IngestError};
pub use ingest_batch::{IngestBatchUseCase, IngestOutcome};
