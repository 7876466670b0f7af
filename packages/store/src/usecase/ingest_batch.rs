//! UseCase: バッチ取り込み処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - IngestBatchUseCase::execute() メソッド
//! - 保存の後、分類済みサンプルごとに 1 件の DisplayUpdate を全購読者へ配信する
//!
//! ### なぜこのテストが必要か
//! - 取り込んだ異常（pothole / bump）を次の定期配信を待たずに地図へ届ける
//! - 保存に失敗したバッチは配信しない
//!
//! ### どのような状況を想定しているか
//! - 正常系：保存と配信（バッチ順）
//! - 異常系：保存失敗
//! - エッジケース：空のバッチ（保存も配信もしない）

use std::sync::Arc;

use michi_shared::{ClassifiedSample, DisplayUpdate};

use crate::domain::{BroadcastReport, SubscriberRegistry, TelemetryRepository};

use super::error::IngestError;

/// 取り込み結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// 保存した記録数
    pub saved: usize,
    /// イベント駆動の配信結果
    pub report: BroadcastReport,
}

/// バッチ取り込みのユースケース
pub struct IngestBatchUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn TelemetryRepository>,
    /// SubscriberRegistry（購読者への配信の抽象化）
    registry: Arc<dyn SubscriberRegistry>,
}

impl IngestBatchUseCase {
    /// 新しい IngestBatchUseCase を作成
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        registry: Arc<dyn SubscriberRegistry>,
    ) -> Self {
        Self {
            repository,
            registry,
        }
    }

    /// バッチ取り込みを実行
    ///
    /// # Returns
    ///
    /// * `Ok(IngestOutcome)` - 保存した件数と配信結果
    /// * `Err(IngestError)` - 保存失敗（何も配信しない）
    pub async fn execute(&self, batch: Vec<ClassifiedSample>) -> Result<IngestOutcome, IngestError> {
        if batch.is_empty() {
            return Ok(IngestOutcome {
                saved: 0,
                report: BroadcastReport::default(),
            });
        }

        // 1. 表示用メッセージを先に作る（batch は Repository に渡すため）
        let mut messages = Vec::with_capacity(batch.len());
        for classified in &batch {
            match DisplayUpdate::from(classified).to_json() {
                Ok(json) => messages.push(json),
                Err(e) => tracing::warn!("Skipping display update that failed to encode: {}", e),
            }
        }

        // 2. 保存
        let ids = self.repository.save_batch(batch).await?;
        tracing::debug!("Saved {} record(s)", ids.len());

        // 3. イベント駆動の配信
        let report = self.registry.broadcast(&messages).await;

        Ok(IngestOutcome {
            saved: ids.len(),
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockTelemetryRepository, RepositoryError},
        infrastructure::message_pusher::WebSocketSubscriberRegistry,
    };
    use chrono::{TimeZone, Utc};
    use michi_shared::{Accelerometer, Gps, RoadState, Sample};
    use tokio::sync::mpsc;

    fn create_classified(latitude: f64, road_state: RoadState) -> ClassifiedSample {
        ClassifiedSample::new(
            road_state,
            Sample::new(
                Accelerometer { x: 0, y: 0, z: 0 },
                Gps {
                    latitude,
                    longitude: 30.0,
                },
                Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
                1,
            ),
        )
    }

    #[tokio::test]
    async fn test_ingest_saves_then_pushes_one_update_per_sample() {
        // テスト項目: 保存後、サンプルごとの DisplayUpdate がバッチ順に届く
        // given (前提条件):
        let mut repository = MockTelemetryRepository::new();
        repository
            .expect_save_batch()
            .withf(|batch| batch.len() == 2)
            .times(1)
            .returning(|_| Ok(vec![1, 2]));
        let registry = Arc::new(WebSocketSubscriberRegistry::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = crate::domain::SubscriberId::generate();
        registry.register(id, tx).await;
        let usecase = IngestBatchUseCase::new(Arc::new(repository), registry);

        // when (操作):
        let outcome = usecase
            .execute(vec![
                create_classified(50.1, RoadState::Normal),
                create_classified(50.2, RoadState::Pothole),
            ])
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.saved, 2);
        assert_eq!(outcome.report.delivered, 1);
        let first: DisplayUpdate = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        let second: DisplayUpdate = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(first, DisplayUpdate::new(50.1, 30.0, RoadState::Normal));
        assert_eq!(second, DisplayUpdate::new(50.2, 30.0, RoadState::Pothole));
    }

    #[tokio::test]
    async fn test_ingest_failure_pushes_nothing() {
        // テスト項目: 保存に失敗した場合は配信しない
        // given (前提条件):
        let mut repository = MockTelemetryRepository::new();
        repository
            .expect_save_batch()
            .returning(|_| Err(RepositoryError::Unavailable("disk full".to_string())));
        let registry = Arc::new(WebSocketSubscriberRegistry::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry
            .register(crate::domain::SubscriberId::generate(), tx)
            .await;
        let usecase = IngestBatchUseCase::new(Arc::new(repository), registry);

        // when (操作):
        let result = usecase
            .execute(vec![create_classified(50.1, RoadState::Bump)])
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(IngestError::Repository(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_ingest_empty_batch_is_noop() {
        // テスト項目: 空のバッチは保存も配信もしない
        // given (前提条件):
        let mut repository = MockTelemetryRepository::new();
        repository.expect_save_batch().times(0);
        let registry = Arc::new(WebSocketSubscriberRegistry::new());
        let usecase = IngestBatchUseCase::new(Arc::new(repository), registry);

        // when (操作):
        let outcome = usecase.execute(Vec::new()).await.unwrap();

        // then (期待する結果):
        assert_eq!(outcome.saved, 0);
        assert_eq!(outcome.report.attempted(), 0);
    }
}
