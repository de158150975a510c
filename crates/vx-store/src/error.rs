//! Storage-layer errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the CSV source and the Parquet artifact writer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{table} table is missing required column {column}")]
    MissingColumn { table: String, column: String },

    #[error("event source {} has no header row", .path.display())]
    EmptyHeader { path: PathBuf },

    #[error("invalid table key {0:?}: keys must be non-empty and contain no path separators")]
    InvalidKey(String),

    #[error(
        "refusing to overwrite {}: directory is non-empty and carries no artifact manifest",
        .0.display()
    )]
    NotAnArtifact(PathBuf),

    #[error("artifact has no table under key {key:?}")]
    MissingTable { key: String },

    #[error("artifact schema version {version} is not readable by this build")]
    IncompatibleSchema { version: String },
}
