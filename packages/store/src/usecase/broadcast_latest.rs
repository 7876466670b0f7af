//! UseCase: 最新状態の定期配信
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - BroadcastLatestStateUseCase::execute() メソッド
//! - 最新の記録を DisplayUpdate として全購読者へ配信する
//!
//! ### なぜこのテストが必要か
//! - 接続したばかりの購読者にも、新しい取り込みを待たずに現在位置を届ける
//! - 記録がない間は何も配信しない
//!
//! ### どのような状況を想定しているか
//! - 正常系：最新状態の配信（変化がなくても毎回配信する）
//! - エッジケース：記録がない
//! - 異常系：Repository の読み出し失敗

use std::sync::Arc;

use michi_shared::DisplayUpdate;

use crate::domain::{BroadcastReport, RepositoryError, SubscriberRegistry, TelemetryRepository};

use super::error::BroadcastError;

/// 最新状態配信のユースケース
pub struct BroadcastLatestStateUseCase {
    repository: Arc<dyn TelemetryRepository>,
    registry: Arc<dyn SubscriberRegistry>,
}

impl BroadcastLatestStateUseCase {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        registry: Arc<dyn SubscriberRegistry>,
    ) -> Self {
        Self {
            repository,
            registry,
        }
    }

    /// 最新状態を配信
    ///
    /// # Returns
    ///
    /// * `Ok(Some(report))` - 配信した
    /// * `Ok(None)` - 記録がまだないので配信しなかった
    pub async fn execute(&self) -> Result<Option<BroadcastReport>, BroadcastError> {
        let Some(update) = self.latest().await? else {
            return Ok(None);
        };

        let message = update.to_json()?;
        let report = self.registry.broadcast(&[message]).await;
        Ok(Some(report))
    }

    /// 最新状態の表示用タプル
    pub async fn latest(&self) -> Result<Option<DisplayUpdate>, RepositoryError> {
        Ok(self.repository.latest().await?.map(DisplayUpdate::from))
    }
}
