//! Error types for the telemetry store.

use std::io;
use std::path::PathBuf;

/// Errors raised while loading, updating or persisting a telemetry document.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The storage file does not exist.
    #[error("Could not find storage.json at {}", path.display())]
    NotFound { path: PathBuf },

    /// The storage file exists but is not a JSON object.
    #[error("Invalid JSON format in {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// The storage file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document could not be serialized or written back.
    #[error("Failed to update JSON file: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
