//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use std::time::Duration;

use michi_shared::{DisplayUpdate, MalformedInputError, RoadState};

use crate::error::ClientError;

pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const RECONNECT_INTERVAL_SECS: u64 = 5;

/// One point of the vehicle trail
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub road_state: RoadState,
}

impl From<DisplayUpdate> for TrailPoint {
    fn from(update: DisplayUpdate) -> Self {
        Self {
            latitude: update.latitude,
            longitude: update.longitude,
            road_state: update.road_state,
        }
    }
}

/// Decode one text frame from the store.
///
/// # Returns
///
/// * `Ok(Some(point))` - a display update
/// * `Ok(None)` - an empty frame (blank, `null`, `{}` or `[]`), skipped
/// * `Err(ClientError::Malformed)` - anything else
pub fn decode_frame(text: &str) -> Result<Option<TrailPoint>, ClientError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| MalformedInputError::json(trimmed, e.to_string()))?;
    let is_empty = match &value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if is_empty {
        return Ok(None);
    }

    let update: DisplayUpdate = serde_json::from_value(value)
        .map_err(|e| MalformedInputError::json(trimmed, e.to_string()))?;
    Ok(Some(update.into()))
}

/// Reconnection limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RECONNECT_ATTEMPTS,
            interval: Duration::from_secs(RECONNECT_INTERVAL_SECS),
        }
    }
}

/// Check if the client should exit immediately based on the error type.
///
/// # Returns
///
/// `true` if retrying cannot help (e.g., InvalidUrl), `false` otherwise
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(error, ClientError::InvalidUrl(_))
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(error: &ClientError, current_attempt: u32, max_attempts: u32) -> bool {
    if should_exit_immediately(error) {
        return false;
    }

    current_attempt < max_attempts
}
