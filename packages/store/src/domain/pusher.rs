//! SubscriberRegistry trait 定義
//!
//! ライブ購読者の集合（SubscriberSet）と、その全員へのメッセージ配信のインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::subscriber::{PusherChannel, SubscriberId};

/// 1 回のブロードキャストの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 全メッセージを受け取った購読者の数
    pub delivered: usize,
    /// 配信に失敗して集合から削除された購読者
    pub pruned: Vec<SubscriberId>,
}

impl BroadcastReport {
    /// 配信を試みた購読者の数
    pub fn attempted(&self) -> usize {
        self.delivered + self.pruned.len()
    }
}

/// SubscriberSet の管理とメッセージ配信
///
/// ## 不変条件
///
/// - 集合を変更するのは登録（接続受付）・登録解除（切断）・ブロードキャスト（配信失敗時の削除）のみ
/// - 定期配信とイベント駆動の配信は同じ集合に対して直列に実行される
/// - 1 人の購読者への配信失敗は、他の購読者への配信を止めない
#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    /// 購読者を登録
    async fn register(&self, id: SubscriberId, channel: PusherChannel);

    /// 購読者を登録解除（登録されていた場合は true）
    async fn unregister(&self, id: &SubscriberId) -> bool;

    /// 全購読者に `messages` を順番に配信し、失敗した購読者を集合から削除する
    async fn broadcast(&self, messages: &[String]) -> BroadcastReport;

    /// 登録中の購読者数
    async fn count(&self) -> usize;
}
