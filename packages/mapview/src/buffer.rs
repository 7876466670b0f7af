//! Staging buffer between the socket reader and the display.
//!
//! Pushes append. [`PointBuffer::drain`] swaps the staging list for an empty one under the lock,
//! so every point pushed before a drain is returned by that drain or the next one, exactly once.

use tokio::sync::Mutex;

use crate::domain::TrailPoint;

#[derive(Debug, Default)]
pub struct PointBuffer {
    staging: Mutex<Vec<TrailPoint>>,
}

impl PointBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, point: TrailPoint) {
        self.staging.lock().await.push(point);
    }

    pub async fn extend(&self, points: impl IntoIterator<Item = TrailPoint>) {
        self.staging.lock().await.extend(points);
    }

    /// Take everything staged so far, oldest first
    pub async fn drain(&self) -> Vec<TrailPoint> {
        std::mem::take(&mut *self.staging.lock().await)
    }

    pub async fn len(&self) -> usize {
        self.staging.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.staging.lock().await.is_empty()
    }
}
