//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use michi_shared::ClassifiedSample;

use super::{
    entity::{LatestStateRecord, RecordId},
    error::RepositoryError,
};

/// Telemetry Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// 分類済みサンプルのバッチを保存し、採番された ID を返す
    async fn save_batch(
        &self,
        batch: Vec<ClassifiedSample>,
    ) -> Result<Vec<RecordId>, RepositoryError>;

    /// タイムスタンプが最も新しい記録（同時刻なら最後に保存されたもの）
    async fn latest(&self) -> Result<Option<LatestStateRecord>, RepositoryError>;

    /// 保存されている記録数
    async fn count(&self) -> usize;
}
