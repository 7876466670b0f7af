//! Telemetry data model.
//!
//! These types double as the producer→store wire format: a batch is a JSON array of
//! [`ClassifiedSample`] values.
//!
//! ```text
//! [{"road_state": "pothole",
//!   "agent_data": {"accelerometer": {"x": 1, "y": 2, "z": -700},
//!                  "gps": {"latitude": 50.45, "longitude": 30.52},
//!                  "timestamp": "2024-03-01T10:15:30.000000Z",
//!                  "user_id": 1}}]
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Raw accelerometer reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accelerometer {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// GPS fix in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gps {
    pub latitude: f64,
    pub longitude: f64,
}

/// One accelerometer + GPS reading with its owning user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub accelerometer: Accelerometer,
    pub gps: Gps,
    #[serde(with = "crate::time::iso8601")]
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
}

impl Sample {
    pub fn new(
        accelerometer: Accelerometer,
        gps: Gps,
        timestamp: DateTime<Utc>,
        user_id: i64,
    ) -> Self {
        Self {
            accelerometer,
            gps,
            timestamp,
            user_id,
        }
    }
}

/// Road surface label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadState {
    #[default]
    Normal,
    Pothole,
    Bump,
}

impl RoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadState::Normal => "normal",
            RoadState::Pothole => "pothole",
            RoadState::Bump => "bump",
        }
    }
}

impl fmt::Display for RoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sample together with the road state it was classified as
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedSample {
    pub road_state: RoadState,
    #[serde(rename = "agent_data")]
    pub sample: Sample,
}

impl ClassifiedSample {
    pub fn new(road_state: RoadState, sample: Sample) -> Self {
        Self { road_state, sample }
    }
}

/// Deserialize a road state where `null` means `normal`.
///
/// Combine with `#[serde(default)]` so that a missing field means `normal` too.
pub fn road_state_or_normal<'de, D>(deserializer: D) -> Result<RoadState, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RoadState>::deserialize(deserializer)?.unwrap_or_default())
}
