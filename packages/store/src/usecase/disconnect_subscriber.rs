//! UseCase: 購読者の切断処理

use std::sync::Arc;

use crate::domain::{SubscriberId, SubscriberRegistry};

/// 購読者切断のユースケース
pub struct DisconnectSubscriberUseCase {
    registry: Arc<dyn SubscriberRegistry>,
}

impl DisconnectSubscriberUseCase {
    pub fn new(registry: Arc<dyn SubscriberRegistry>) -> Self {
        Self { registry }
    }

    /// SubscriberSet から削除する
    ///
    /// 配信失敗ですでに削除されていた場合は false を返す
    pub async fn execute(&self, id: &SubscriberId) -> bool {
        self.registry.unregister(id).await
    }
}
