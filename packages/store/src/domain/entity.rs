//! Stored telemetry records.

use chrono::{DateTime, Utc};
use michi_shared::{Accelerometer, ClassifiedSample, DisplayUpdate, Gps, RoadState};

/// Identifier assigned by the repository, starting at 1
pub type RecordId = u64;

/// One persisted classified sample
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub road_state: RoadState,
    pub accelerometer: Accelerometer,
    pub gps: Gps,
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
}

impl StoredRecord {
    pub fn from_classified(id: RecordId, classified: &ClassifiedSample) -> Self {
        Self {
            id,
            road_state: classified.road_state,
            accelerometer: classified.sample.accelerometer,
            gps: classified.sample.gps,
            timestamp: classified.sample.timestamp,
            user_id: classified.sample.user_id,
        }
    }
}

/// Snapshot of the most recent record, as shown on the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestStateRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub road_state: RoadState,
}

impl From<&StoredRecord> for LatestStateRecord {
    fn from(record: &StoredRecord) -> Self {
        Self {
            latitude: record.gps.latitude,
            longitude: record.gps.longitude,
            road_state: record.road_state,
        }
    }
}

impl From<LatestStateRecord> for DisplayUpdate {
    fn from(record: LatestStateRecord) -> Self {
        DisplayUpdate::new(record.latitude, record.longitude, record.road_state)
    }
}
