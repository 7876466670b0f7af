//! UseCase: テレメトリのストリーミング
//!
//! サンプル源 → 路面分類 → バッチ送信 を 1 本の逐次ループで実行します。
//!
//! ## 設計ノート
//!
//! - 同時に処理中のサンプルは常に 1 件（分類器のウィンドウは並行に共有しない）
//! - 送信は 1 バッチにつき 1 回だけ試行する。失敗したバッチはログに残して破棄し、
//!   次のバッチの送信が成功した時点で購読者側の表示が最新に追いつく

use std::{sync::Arc, time::Duration};

use michi_shared::{ClassifiedSample, RoadState};
use tokio::sync::watch;

use crate::domain::{BatchTransmitter, ReplayError, RoadSurfaceClassifier, SampleSource};

/// Counters kept by the producer loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub samples: u64,
    pub potholes: u64,
    pub bumps: u64,
    pub batches_sent: u64,
    pub batches_failed: u64,
}

/// 逐次プロデューサーループ
pub struct TelemetryPipeline<S: SampleSource> {
    /// サンプル源（リプレイ）
    source: S,
    /// このストリーム専用の分類器
    classifier: RoadSurfaceClassifier,
    /// BatchTransmitter（送信の抽象化）
    transmitter: Arc<dyn BatchTransmitter>,
    /// 1 バッチあたりのサンプル数
    batch_size: usize,
    /// 送信待ちのサンプル
    pending: Vec<ClassifiedSample>,
    stats: PipelineStats,
}

impl<S: SampleSource> TelemetryPipeline<S> {
    /// 新しい TelemetryPipeline を作成
    ///
    /// `batch_size` が 0 の場合は 1 として扱う
    pub fn new(source: S, transmitter: Arc<dyn BatchTransmitter>, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            source,
            classifier: RoadSurfaceClassifier::new(),
            transmitter,
            batch_size,
            pending: Vec::with_capacity(batch_size),
            stats: PipelineStats::default(),
        }
    }

    /// サンプルを 1 件読み、分類して送信待ちに積む
    ///
    /// # Returns
    ///
    /// * `Ok(Some(bool))` - バッチが満杯になり送信した（送信結果）
    /// * `Ok(None)` - まだバッチが満杯でない
    /// * `Err(ReplayError)` - サンプル源のエラー（ループを止める）
    pub async fn step(&mut self) -> Result<Option<bool>, ReplayError> {
        let sample = self.source.read()?;
        let classified = self.classifier.classify(sample);

        self.stats.samples += 1;
        match classified.road_state {
            RoadState::Pothole => self.stats.potholes += 1,
            RoadState::Bump => self.stats.bumps += 1,
            RoadState::Normal => {}
        }
        self.pending.push(classified);

        if self.pending.len() >= self.batch_size {
            return Ok(Some(self.flush().await));
        }
        Ok(None)
    }

    /// 送信待ちのサンプルを 1 バッチとして送信する
    ///
    /// 送信結果に関係なく送信待ちは空になる
    pub async fn flush(&mut self) -> bool {
        if self.pending.is_empty() {
            return true;
        }

        let batch = std::mem::replace(&mut self.pending, Vec::with_capacity(self.batch_size));
        if self.transmitter.send(&batch).await {
            self.stats.batches_sent += 1;
            true
        } else {
            self.stats.batches_failed += 1;
            tracing::warn!(
                "Dropping batch of {} samples after failed delivery",
                batch.len()
            );
            false
        }
    }

    /// シャットダウンが通知されるまで `delay` 間隔でサンプルを処理する
    ///
    /// 終了時に送信待ちのサンプルを送信してから統計を返す
    pub async fn run(
        &mut self,
        delay: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<PipelineStats, ReplayError> {
        tracing::info!(
            "Streaming telemetry (batch size {}, delay {:?})",
            self.batch_size,
            delay
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            self.step().await?;
        }

        self.flush().await;
        tracing::info!("Telemetry stream stopped: {:?}", self.stats);
        Ok(self.stats)
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// 送信待ちのサンプル数
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn classifier(&self) -> &RoadSurfaceClassifier {
        &self.classifier
    }

    /// サンプル源を取り出す（close するため）
    pub fn into_source(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use michi_shared::{Accelerometer, Gps, Sample};
    use std::{collections::VecDeque, sync::Mutex};

    // Mock SampleSource for testing
    struct MockSampleSource {
        z_values: VecDeque<i32>,
    }

    impl MockSampleSource {
        fn new(z_values: &[i32]) -> Self {
            Self {
                z_values: z_values.iter().copied().collect(),
            }
        }
    }

    impl SampleSource for MockSampleSource {
        fn read(&mut self) -> Result<Sample, ReplayError> {
            let z = self.z_values.pop_front().ok_or(ReplayError::NotReady)?;
            Ok(Sample::new(
                Accelerometer { x: 0, y: 0, z },
                Gps {
                    latitude: 50.0,
                    longitude: 30.0,
                },
                Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
                1,
            ))
        }
    }

    // Mock BatchTransmitter for testing (records every batch it is given)
    struct MockBatchTransmitter {
        succeed: bool,
        batches: Mutex<Vec<Vec<ClassifiedSample>>>,
    }

    impl MockBatchTransmitter {
        fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                succeed,
                batches: Mutex::new(Vec::new()),
            })
        }

        fn batches(&self) -> Vec<Vec<ClassifiedSample>> {
            self.batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BatchTransmitter for MockBatchTransmitter {
        async fn send(&self, batch: &[ClassifiedSample]) -> bool {
            self.batches.lock().unwrap().push(batch.to_vec());
            self.succeed
        }
    }

    #[tokio::test]
    async fn test_step_sends_full_batch() {
        // テスト項目: バッチが満杯になった時点で 1 回だけ送信される
        // given (前提条件):
        let transmitter = MockBatchTransmitter::new(true);
        let source = MockSampleSource::new(&[500, 500, -700]);
        let mut pipeline = TelemetryPipeline::new(source, transmitter.clone(), 3);

        // when (操作):
        let first = pipeline.step().await.unwrap();
        let second = pipeline.step().await.unwrap();
        let third = pipeline.step().await.unwrap();

        // then (期待する結果):
        assert_eq!(first, None);
        assert_eq!(second, None);
        assert_eq!(third, Some(true));

        let batches = transmitter.batches();
        assert_eq!(batches.len(), 1);
        let labels: Vec<RoadState> = batches[0].iter().map(|c| c.road_state).collect();
        assert_eq!(
            labels,
            vec![RoadState::Normal, RoadState::Normal, RoadState::Pothole]
        );
        assert_eq!(pipeline.pending_len(), 0);
        assert_eq!(pipeline.stats().potholes, 1);
        assert_eq!(pipeline.stats().batches_sent, 1);
    }

    #[tokio::test]
    async fn test_failed_batch_is_dropped() {
        // テスト項目: 送信に失敗したバッチは破棄され、失敗数に数えられる
        // given (前提条件):
        let transmitter = MockBatchTransmitter::new(false);
        let source = MockSampleSource::new(&[0, 0]);
        let mut pipeline = TelemetryPipeline::new(source, transmitter.clone(), 2);

        // when (操作):
        pipeline.step().await.unwrap();
        let result = pipeline.step().await.unwrap();

        // then (期待する結果):
        assert_eq!(result, Some(false));
        assert_eq!(pipeline.pending_len(), 0);
        assert_eq!(pipeline.stats().batches_failed, 1);
        assert_eq!(transmitter.batches().len(), 1);
    }

    #[tokio::test]
    async fn test_step_propagates_source_error() {
        // テスト項目: サンプル源のエラーはそのまま呼び出し元に返る
        // given (前提条件):
        let transmitter = MockBatchTransmitter::new(true);
        let mut pipeline = TelemetryPipeline::new(MockSampleSource::new(&[]), transmitter, 1);

        // when (操作):
        let result = pipeline.step().await;

        // then (期待する結果):
        assert!(matches!(result, Err(ReplayError::NotReady)));
    }

    #[tokio::test]
    async fn test_flush_with_nothing_pending_does_not_send() {
        // テスト項目: 送信待ちがない場合は送信しない
        // given (前提条件):
        let transmitter = MockBatchTransmitter::new(true);
        let mut pipeline =
            TelemetryPipeline::new(MockSampleSource::new(&[]), transmitter.clone(), 5);

        // when (操作):
        let result = pipeline.flush().await;

        // then (期待する結果):
        assert!(result);
        assert!(transmitter.batches().is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown_and_flushes_partial_batch() {
        // テスト項目: シャットダウン通知で停止し、途中のバッチを送信する
        // given (前提条件):
        let transmitter = MockBatchTransmitter::new(true);
        let source = MockSampleSource::new(&[0; 1000]);
        let mut pipeline = TelemetryPipeline::new(source, transmitter.clone(), 1000);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // when (操作):
        let handle = tokio::spawn(async move {
            let stats = pipeline
                .run(Duration::from_millis(5), shutdown_rx)
                .await
                .unwrap();
            (stats, pipeline.pending_len())
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(true).unwrap();
        let (stats, pending) = handle.await.unwrap();

        // then (期待する結果):
        assert!(stats.samples > 0);
        assert_eq!(pending, 0);
        assert_eq!(stats.batches_sent, 1);
        assert_eq!(transmitter.batches()[0].len() as u64, stats.samples);
    }

    #[tokio::test]
    async fn test_zero_batch_size_sends_every_sample() {
        // テスト項目: バッチサイズ 0 は 1 として扱われる
        // given (前提条件):
        let transmitter = MockBatchTransmitter::new(true);
        let mut pipeline =
            TelemetryPipeline::new(MockSampleSource::new(&[1, 2]), transmitter.clone(), 0);

        // when (操作):
        let result = pipeline.step().await.unwrap();

        // then (期待する結果):
        assert_eq!(result, Some(true));
        assert_eq!(transmitter.batches()[0].len(), 1);
    }
}
