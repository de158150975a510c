//! Error types for Ventex.

use thiserror::Error;

/// Result type alias for Ventex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Ventex.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid window specification: {0}")]
    InvalidWindow(String),

    // Episode index errors (20-29)
    #[error("episode table error: {0}")]
    EpisodeTable(String),

    #[error(
        "conflicting end times for first episode of stay {stay}: {first} vs {second}"
    )]
    EpisodeConflict {
        stay: i64,
        first: String,
        second: String,
    },

    // Extraction errors (30-39)
    #[error("event source error: {0}")]
    EventSource(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("finalize failed for window {window}: {reason}")]
    Finalize { window: String, reason: String },

    // Persistence errors (40-49)
    #[error("artifact store error: {0}")]
    Store(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting and exit-code mapping.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidWindow(_) => 11,
            Error::EpisodeTable(_) => 20,
            Error::EpisodeConflict { .. } => 21,
            Error::EventSource(_) => 30,
            Error::Extraction(_) => 31,
            Error::Finalize { .. } => 32,
            Error::Store(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }
}
