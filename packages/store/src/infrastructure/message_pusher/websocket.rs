//! WebSocket を使った SubscriberRegistry 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - 全購読者へのブロードキャストと、配信に失敗した購読者の削除
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//!
//! ブロードキャストはロックを保持したまま全購読者を走査し、失敗した購読者を
//! 走査の後でまとめて削除します。定期配信とイベント駆動の配信が同時に
//! 集合を変更することはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    BroadcastReport, MessagePushError, PusherChannel, SubscriberId, SubscriberRegistry,
};

/// WebSocket を使った SubscriberRegistry 実装
pub struct WebSocketSubscriberRegistry {
    /// 接続中の購読者の WebSocket sender
    subscribers: Arc<Mutex<HashMap<SubscriberId, PusherChannel>>>,
}

impl WebSocketSubscriberRegistry {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for WebSocketSubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn push_all(sender: &PusherChannel, messages: &[String]) -> Result<(), MessagePushError> {
    for message in messages {
        sender
            .send(message.clone())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
    }
    Ok(())
}

#[async_trait]
impl SubscriberRegistry for WebSocketSubscriberRegistry {
    async fn register(&self, id: SubscriberId, channel: PusherChannel) {
        let mut subscribers = self.subscribers.lock().await;
        subscribers.insert(id, channel);
        tracing::debug!(
            "Subscriber '{}' registered ({} live)",
            id,
            subscribers.len()
        );
    }

    async fn unregister(&self, id: &SubscriberId) -> bool {
        let mut subscribers = self.subscribers.lock().await;
        let removed = subscribers.remove(id).is_some();
        if removed {
            tracing::debug!(
                "Subscriber '{}' unregistered ({} live)",
                id,
                subscribers.len()
            );
        }
        removed
    }

    async fn broadcast(&self, messages: &[String]) -> BroadcastReport {
        let mut subscribers = self.subscribers.lock().await;
        let mut report = BroadcastReport::default();

        if messages.is_empty() {
            return report;
        }

        for (id, sender) in subscribers.iter() {
            // 1 人の失敗で他の購読者への配信は止めない
            match push_all(sender, messages) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!("Failed to push to subscriber '{}': {}", id, e);
                    report.pruned.push(*id);
                }
            }
        }

        for id in &report.pruned {
            subscribers.remove(id);
        }
        if !report.pruned.is_empty() {
            tracing::info!(
                "Removed {} unreachable subscriber(s), {} live",
                report.pruned.len(),
                subscribers.len()
            );
        }

        report
    }

    async fn count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - WebSocketSubscriberRegistry の登録・解除・ブロードキャスト
    //
    // 【なぜこのテストが必要か】
    // - 1 人の購読者の切断が他の購読者への配信を止めてはいけない
    // - 配信に失敗した購読者は集合から削除され、次の配信では対象外になる
    //
    // 【どのようなシナリオをテストするか】
    // 1. 全員への配信成功
    // 2. 途中の購読者が切断済みでも残りに届き、切断済みの購読者は削除される
    // 3. 同じ内容を 2 回配信すると同じメッセージが 2 回届く
    // 4. 購読者がいない場合の配信
    // 5. 登録解除
    // ========================================

    type Receiver = mpsc::UnboundedReceiver<String>;

    async fn register_new(registry: &WebSocketSubscriberRegistry) -> (SubscriberId, Receiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SubscriberId::generate();
        registry.register(id, tx).await;
        (id, rx)
    }

    async fn registered_ids(registry: &WebSocketSubscriberRegistry) -> Vec<SubscriberId> {
        let mut ids: Vec<SubscriberId> = registry.subscribers.lock().await.keys().copied().collect();
        ids.sort_by_key(|id| *id.as_uuid());
        ids
    }

    fn messages(contents: &[&str]) -> Vec<String> {
        contents.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_subscriber_in_order() {
        // テスト項目: 全購読者に全メッセージが順番通り届く
        // given (前提条件):
        let registry = WebSocketSubscriberRegistry::new();
        let (_a, mut rx_a) = register_new(&registry).await;
        let (_b, mut rx_b) = register_new(&registry).await;

        // when (操作):
        let report = registry.broadcast(&messages(&["first", "second"])).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert!(report.pruned.is_empty());
        for rx in [&mut rx_a, &mut rx_b] {
            assert_eq!(rx.recv().await.as_deref(), Some("first"));
            assert_eq!(rx.recv().await.as_deref(), Some("second"));
        }
    }

    #[tokio::test]
    async fn test_broadcast_prunes_failed_subscriber_and_continues() {
        // テスト項目: 切断済みの購読者は削除され、他の購読者には届く
        // given (前提条件):
        let registry = WebSocketSubscriberRegistry::new();
        let (first, mut rx_first) = register_new(&registry).await;
        let (second, rx_second) = register_new(&registry).await;
        let (third, mut rx_third) = register_new(&registry).await;
        drop(rx_second);

        // when (操作):
        let report = registry.broadcast(&messages(&["tick"])).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert_eq!(report.pruned, vec![second]);
        assert_eq!(rx_first.recv().await.as_deref(), Some("tick"));
        assert_eq!(rx_third.recv().await.as_deref(), Some("tick"));

        let remaining = registered_ids(&registry).await;
        let mut expected = vec![first, third];
        expected.sort_by_key(|id| *id.as_uuid());
        assert_eq!(remaining, expected);

        // 次の配信では 2 人だけが対象になる
        let next = registry.broadcast(&messages(&["tick"])).await;
        assert_eq!(next.attempted(), 2);
        assert_eq!(next.delivered, 2);
    }

    #[tokio::test]
    async fn test_duplicate_broadcast_delivers_identical_messages() {
        // テスト項目: 最新状態が変わらなくても毎回同じメッセージが届く
        // given (前提条件):
        let registry = WebSocketSubscriberRegistry::new();
        let (_id, mut rx) = register_new(&registry).await;
        let payload = messages(&[r#"{"latitude":50.1,"longitude":30.2,"road_state":"normal"}"#]);

        // when (操作):
        registry.broadcast(&payload).await;
        registry.broadcast(&payload).await;

        // then (期待する結果):
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_broadcast_with_no_subscribers() {
        // テスト項目: 購読者がいなくてもエラーにならない
        // given (前提条件):
        let registry = WebSocketSubscriberRegistry::new();

        // when (操作):
        let report = registry.broadcast(&messages(&["tick"])).await;

        // then (期待する結果):
        assert_eq!(report, BroadcastReport::default());
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_unregister_removes_subscriber_from_broadcast() {
        // テスト項目: 登録解除した購読者には配信されず、二重の解除は false を返す
        // given (前提条件):
        let registry = WebSocketSubscriberRegistry::new();
        let (id, mut rx) = register_new(&registry).await;
        let (_other, mut rx_other) = register_new(&registry).await;

        // when (操作):
        let removed = registry.unregister(&id).await;
        let removed_again = registry.unregister(&id).await;
        let report = registry.broadcast(&messages(&["hello"])).await;

        // then (期待する結果):
        assert!(removed);
        assert!(!removed_again);
        assert_eq!(report.attempted(), 1);
        assert_eq!(rx_other.recv().await.as_deref(), Some("hello"));
        assert!(rx.try_recv().is_err());
    }
}
