//! Error types for the sampling sources and snapshot exporters.
//!
//! None of these escape `read()` or `scan()`: the readers log them and degrade.
//! Exporter errors are logged by the observers and never abort a tick.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading or parsing the kernel memory summary source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("expected 2 lines, found {0}")]
    MissingLines(usize),

    #[error("line {line} has no ':' separator")]
    MissingSeparator { line: usize },

    #[error("line {line}: '{value}' is not an integer")]
    InvalidNumber { line: usize, value: String },
}

/// Failure while writing a snapshot export file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode metrics: {0}")]
    Prometheus(#[from] prometheus::Error),
}
