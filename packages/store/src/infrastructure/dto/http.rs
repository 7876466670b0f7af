//! HTTP API request/response DTOs.

use michi_shared::{ClassifiedSample, MalformedInputError};
use serde::{Deserialize, Serialize};

/// Longest excerpt of a rejected body echoed back in an error response
pub const MAX_ECHOED_BODY: usize = 256;

/// Response to a successful ingest: `{"status":"ok","saved":n}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestAck {
    pub status: String,
    pub saved: usize,
}

impl IngestAck {
    pub fn ok(saved: usize) -> Self {
        Self {
            status: "ok".to_string(),
            saved,
        }
    }
}

/// Error response body: `{"error": ..., "detail": ..., "value": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
            value: None,
        }
    }
}

impl From<&MalformedInputError> for ErrorBody {
    fn from(err: &MalformedInputError) -> Self {
        Self {
            error: format!("malformed {}", err.kind),
            detail: err.to_string(),
            value: Some(err.value.clone()),
        }
    }
}

/// Parse an ingest request body into classified samples.
///
/// A bad timestamp inside the array surfaces through serde with the offending value already in
/// the message; the whole body (truncated) is attached as well.
pub fn parse_ingest_body(body: &str) -> Result<Vec<ClassifiedSample>, MalformedInputError> {
    serde_json::from_str(body)
        .map_err(|e| MalformedInputError::json(excerpt(body, MAX_ECHOED_BODY), e.to_string()))
}

fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
