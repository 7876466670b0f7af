//! InMemory Telemetry Repository 実装
//!
//! ドメイン層が定義する TelemetryRepository trait の具体的な実装。
//! Vec をインメモリ DB として使用します。
//!
//! ## 容量
//!
//! 保持する記録数には上限があり、超えた分は古い順に捨てられます。
//! 最新状態の判定はタイムスタンプで行うため、古い記録を捨てても結果は変わりません。

use async_trait::async_trait;
use michi_shared::ClassifiedSample;
use tokio::sync::Mutex;

use crate::domain::{
    LatestStateRecord, RecordId, RepositoryError, StoredRecord, TelemetryRepository,
};

/// デフォルトの最大保持件数
pub const DEFAULT_MAX_RECORDS: usize = 100_000;

struct Table {
    records: Vec<StoredRecord>,
    next_id: RecordId,
}

/// インメモリ Telemetry Repository 実装
pub struct InMemoryTelemetryRepository {
    table: Mutex<Table>,
    max_records: usize,
}

impl InMemoryTelemetryRepository {
    /// 新しい InMemoryTelemetryRepository を作成
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_RECORDS)
    }

    /// 最大保持件数を指定して作成（0 の場合は 1 として扱う）
    pub fn with_capacity(max_records: usize) -> Self {
        Self {
            table: Mutex::new(Table {
                records: Vec::new(),
                next_id: 1,
            }),
            max_records: max_records.max(1),
        }
    }

    /// 保存されている全記録（古い順）
    pub async fn records(&self) -> Vec<StoredRecord> {
        self.table.lock().await.records.clone()
    }
}

impl Default for InMemoryTelemetryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TelemetryRepository for InMemoryTelemetryRepository {
    async fn save_batch(
        &self,
        batch: Vec<ClassifiedSample>,
    ) -> Result<Vec<RecordId>, RepositoryError> {
        let mut table = self.table.lock().await;

        let mut ids = Vec::with_capacity(batch.len());
        for classified in &batch {
            let id = table.next_id;
            table.next_id += 1;
            table
                .records
                .push(StoredRecord::from_classified(id, classified));
            ids.push(id);
        }

        let overflow = table.records.len().saturating_sub(self.max_records);
        if overflow > 0 {
            table.records.drain(..overflow);
            tracing::debug!("Evicted {} oldest records", overflow);
        }

        Ok(ids)
    }

    async fn latest(&self) -> Result<Option<LatestStateRecord>, RepositoryError> {
        let table = self.table.lock().await;
        let latest = table
            .records
            .iter()
            .max_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)))
            .map(LatestStateRecord::from);
        Ok(latest)
    }

    async fn count(&self) -> usize {
        self.table.lock().await.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use michi_shared::{Accelerometer, Gps, RoadState, Sample};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryTelemetryRepository の保存と最新状態の取得
    //
    // 【なぜこのテストが必要か】
    // - 定期配信は「タイムスタンプが最も新しい記録」を毎 tick 読む
    // - 到着順とタイムスタンプ順が一致しない場合でも正しい記録を返す必要がある
    //
    // 【どのようなシナリオをテストするか】
    // 1. 空のリポジトリは None を返す
    // 2. ID は 1 から連番で採番される
    // 3. 到着順ではなくタイムスタンプで最新を選ぶ
    // 4. 同時刻なら後から保存された記録を選ぶ
    // 5. 上限を超えた古い記録は捨てられる
    // ========================================

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, second).unwrap()
    }

    fn create_classified(latitude: f64, road_state: RoadState, timestamp: DateTime<Utc>) -> ClassifiedSample {
        ClassifiedSample::new(
            road_state,
            Sample::new(
                Accelerometer { x: 0, y: 0, z: 0 },
                Gps {
                    latitude,
                    longitude: 30.0,
                },
                timestamp,
                1,
            ),
        )
    }

    #[tokio::test]
    async fn test_latest_on_empty_repository() {
        // テスト項目: 記録がない場合は None を返す
        // given (前提条件):
        let repo = InMemoryTelemetryRepository::new();

        // when (操作):
        let latest = repo.latest().await.unwrap();

        // then (期待する結果):
        assert_eq!(latest, None);
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_save_batch_assigns_sequential_ids() {
        // テスト項目: 保存した記録に 1 から連番の ID が振られる
        // given (前提条件):
        let repo = InMemoryTelemetryRepository::new();
        let first = vec![
            create_classified(50.0, RoadState::Normal, at(0)),
            create_classified(50.1, RoadState::Normal, at(1)),
        ];
        let second = vec![create_classified(50.2, RoadState::Pothole, at(2))];

        // when (操作):
        let first_ids = repo.save_batch(first).await.unwrap();
        let second_ids = repo.save_batch(second).await.unwrap();

        // then (期待する結果):
        assert_eq!(first_ids, vec![1, 2]);
        assert_eq!(second_ids, vec![3]);
        assert_eq!(repo.count().await, 3);
    }

    #[tokio::test]
    async fn test_latest_uses_timestamp_not_arrival_order() {
        // テスト項目: 到着順ではなくタイムスタンプが最も新しい記録を返す
        // given (前提条件):
        let repo = InMemoryTelemetryRepository::new();
        repo.save_batch(vec![create_classified(50.9, RoadState::Pothole, at(30))])
            .await
            .unwrap();
        repo.save_batch(vec![create_classified(50.1, RoadState::Normal, at(10))])
            .await
            .unwrap();

        // when (操作):
        let latest = repo.latest().await.unwrap().unwrap();

        // then (期待する結果):
        assert_eq!(latest.latitude, 50.9);
        assert_eq!(latest.road_state, RoadState::Pothole);
    }

    #[tokio::test]
    async fn test_latest_prefers_last_saved_on_equal_timestamps() {
        // テスト項目: 同時刻の記録が複数ある場合は後から保存された記録を返す
        // given (前提条件):
        let repo = InMemoryTelemetryRepository::new();
        repo.save_batch(vec![
            create_classified(50.1, RoadState::Normal, at(5)),
            create_classified(50.2, RoadState::Bump, at(5)),
        ])
        .await
        .unwrap();

        // when (操作):
        let latest = repo.latest().await.unwrap().unwrap();

        // then (期待する結果):
        assert_eq!(latest.latitude, 50.2);
        assert_eq!(latest.road_state, RoadState::Bump);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_records() {
        // テスト項目: 上限を超えた分は古い順に捨てられ、ID は継続して採番される
        // given (前提条件):
        let repo = InMemoryTelemetryRepository::with_capacity(2);

        // when (操作):
        let ids = repo
            .save_batch(vec![
                create_classified(50.0, RoadState::Normal, at(0)),
                create_classified(50.1, RoadState::Normal, at(1)),
                create_classified(50.2, RoadState::Normal, at(2)),
            ])
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(ids, vec![1, 2, 3]);
        let records = repo.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 2);
        assert_eq!(records[1].id, 3);
    }
}
