//! Ventex table storage.
//!
//! This crate provides:
//! - Arrow schema definitions for the event and episode tables
//! - A chunked CSV event source (one bounded batch resident at a time)
//! - A Parquet artifact writer with per-key partitions and a manifest
//! - Path layout helpers for the output artifact

pub mod error;
pub mod schema;
pub mod source;
pub mod writer;

pub use error::StoreError;
pub use schema::{
    chart_events_schema, chart_events_streaming_schema, episodes_schema, EVENT_COLUMNS,
    ID_COLUMNS,
};
pub use source::{read_episode_table, CsvChunks};
pub use writer::{read_manifest, read_table, ArtifactManifest, ChartStore, ManifestEntry};

/// File name of the artifact manifest inside the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";
