//! Store→subscriber wire message.

use serde::{Deserialize, Serialize};

use crate::telemetry::{ClassifiedSample, RoadState, road_state_or_normal};

/// Display tuple pushed to every live subscriber: `{latitude, longitude, road_state}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayUpdate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, deserialize_with = "road_state_or_normal")]
    pub road_state: RoadState,
}

impl DisplayUpdate {
    pub fn new(latitude: f64, longitude: f64, road_state: RoadState) -> Self {
        Self {
            latitude,
            longitude,
            road_state,
        }
    }

    /// Serialize into the JSON text frame sent over the socket
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&ClassifiedSample> for DisplayUpdate {
    fn from(classified: &ClassifiedSample) -> Self {
        Self {
            latitude: classified.sample.gps.latitude,
            longitude: classified.sample.gps.longitude,
            road_state: classified.road_state,
        }
    }
}
