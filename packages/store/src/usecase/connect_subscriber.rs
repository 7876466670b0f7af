//! UseCase: 購読者の接続処理

use std::sync::Arc;

use crate::domain::{PusherChannel, SubscriberId, SubscriberRegistry};

/// 購読者接続のユースケース
pub struct ConnectSubscriberUseCase {
    registry: Arc<dyn SubscriberRegistry>,
}

impl ConnectSubscriberUseCase {
    pub fn new(registry: Arc<dyn SubscriberRegistry>) -> Self {
        Self { registry }
    }

    /// 新しい ID を採番して SubscriberSet に登録する
    pub async fn execute(&self, channel: PusherChannel) -> SubscriberId {
        let id = SubscriberId::generate();
        self.registry.register(id, channel).await;
        id
    }
}
