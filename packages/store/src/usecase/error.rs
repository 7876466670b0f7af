//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::RepositoryError;

/// バッチ取り込みのエラー
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to persist batch: {0}")]
    Repository(#[from] RepositoryError),
}

/// 最新状態の配信のエラー
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("failed to read latest state: {0}")]
    Repository(#[from] RepositoryError),

    #[error("failed to encode display update: {0}")]
    Encode(#[from] serde_json::Error),
}
