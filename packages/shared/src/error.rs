//! Error types shared across the pipeline.

use std::fmt;

use thiserror::Error;

/// What kind of input was rejected at a parsing boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// ISO-8601 timestamp
    Timestamp,
    /// A named column of a sensor log
    SensorField(String),
    /// A JSON document
    Json,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Timestamp => write!(f, "timestamp"),
            InputKind::SensorField(column) => write!(f, "sensor field '{}'", column),
            InputKind::Json => write!(f, "JSON"),
        }
    }
}

/// Input that could not be parsed.
///
/// The offending value is always carried along so that it can be logged or echoed back to the
/// caller; nothing is ever coerced into a default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed {kind} '{value}': {reason}")]
pub struct MalformedInputError {
    pub kind: InputKind,
    pub value: String,
    pub reason: String,
}

impl MalformedInputError {
    pub fn timestamp(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: InputKind::Timestamp,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn sensor_field(
        column: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind: InputKind::SensorField(column.into()),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn json(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: InputKind::Json,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
