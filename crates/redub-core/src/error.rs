//! Error types for redub.

use thiserror::Error;

/// Main error type for redub operations.
///
/// Per-segment failures (`Decode` on a clip, `DegenerateSignal`) are
/// recovered locally by the compositor; everything else aborts the run.
#[derive(Error, Debug)]
pub enum RedubError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Range error: {0}")]
    Range(String),

    #[error("Degenerate signal: {0}")]
    DegenerateSignal(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Mux error: {0}")]
    Mux(String),

    #[error("Resample error: {0}")]
    Resample(String),

    #[error("Timeline error: {0}")]
    Timeline(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for redub operations.
pub type Result<T> = std::result::Result<T, RedubError>;
