//! Server state.

use std::sync::Arc;

use crate::usecase::{
    BroadcastLatestStateUseCase, ConnectSubscriberUseCase, DisconnectSubscriberUseCase,
    IngestBatchUseCase,
};

/// Shared application state
pub struct AppState {
    /// IngestBatchUseCase（バッチ取り込みと即時配信）
    pub ingest_batch_usecase: Arc<IngestBatchUseCase>,
    /// BroadcastLatestStateUseCase（最新状態の取得と定期配信）
    pub broadcast_latest_usecase: Arc<BroadcastLatestStateUseCase>,
    /// ConnectSubscriberUseCase（購読者の接続）
    pub connect_subscriber_usecase: Arc<ConnectSubscriberUseCase>,
    /// DisconnectSubscriberUseCase（購読者の切断）
    pub disconnect_subscriber_usecase: Arc<DisconnectSubscriberUseCase>,
}
