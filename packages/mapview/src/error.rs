//! Error types for the map client.

use michi_shared::MalformedInputError;
use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The store URL cannot be used
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    /// Could not connect
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Was connected, then lost the connection
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// A frame that is not a display update
    #[error(transparent)]
    Malformed(#[from] MalformedInputError),
}
