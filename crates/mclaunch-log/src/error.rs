//! Error types for the log layer.

use std::path::PathBuf;

/// Errors that can occur while recording or rotating a run's log.
///
/// None of these stop the supervised process: the caller decides what to
/// do with them once the run is over. Content already written stays where
/// it is.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Creating, writing, or truncating a log file failed
    /// (disk full, permissions, missing directory…).
    #[error("failed to write log {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the live log back during rotation failed.
    #[error("failed to read log {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The exit timestamp could not be turned into a file name.
    #[error("failed to format rotation timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}
