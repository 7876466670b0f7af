//! Error types for the agent domain.

use std::path::PathBuf;

use michi_shared::MalformedInputError;
use thiserror::Error;

/// Errors raised by a sample source.
///
/// These are caller contract violations or broken input files; the producer loop stops on them
/// instead of retrying.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// `read()` called before `open()` or after `close()`
    #[error("replay source is not open")]
    NotReady,

    #[error("failed to read sensor log {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sensor log {} has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("sensor log {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: MalformedInputError,
    },

    #[error("sensor log {} has no data rows", .path.display())]
    EmptyLog { path: PathBuf },
}
