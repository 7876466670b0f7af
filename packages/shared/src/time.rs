//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::error::MalformedInputError;

/// Naive layouts accepted in addition to RFC 3339. Naive values are taken as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get the current time in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    pub fn new(fixed_time: DateTime<Utc>) -> Self {
        Self { fixed_time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.fixed_time
    }
}

/// Parse an ISO-8601 timestamp.
///
/// RFC 3339 values with an offset are converted to UTC. Values without an offset are
/// interpreted as UTC. Anything else is rejected with the original value attached.
pub fn parse_iso8601(value: &str) -> Result<DateTime<Utc>, MalformedInputError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            MalformedInputError::timestamp(
                value,
                "expected ISO 8601 format (YYYY-MM-DDTHH:MM:SSZ)",
            )
        })
}

/// Format a timestamp as RFC 3339 in UTC (e.g. `2024-03-01T10:15:30.250000Z`)
pub fn to_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serde adapter for ISO-8601 timestamp fields.
///
/// ```ignore
/// #[serde(with = "michi_shared::time::iso8601")]
/// pub timestamp: DateTime<Utc>,
/// ```
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_iso8601(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso8601(&raw).map_err(serde::de::Error::custom)
    }
}
