//! Parquet artifact writer.
//!
//! The output of a run is one directory holding one Parquet partition
//! per window plus a manifest. Creating the store claims the directory
//! (the first table written overwrites any previous artifact); each
//! subsequent table is appended under its own key; `finish` seals the
//! artifact by writing the manifest.

use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::MANIFEST_FILE;
use vx_common::{RunId, SCHEMA_VERSION};

// ── Manifest ────────────────────────────────────────────────────────────

/// Description of one table partition inside the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Partition key (the window name).
    pub key: String,
    /// File name relative to the artifact directory.
    pub file: String,
    /// Row count at write time.
    pub rows: u64,
}

/// Artifact-level metadata, written as `manifest.json` on `finish`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub schema_version: String,
    pub run_id: RunId,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    pub tables: Vec<ManifestEntry>,
}

// ── Store ───────────────────────────────────────────────────────────────

/// Writer handle for one output artifact.
#[derive(Debug)]
pub struct ChartStore {
    dir: PathBuf,
    manifest: ArtifactManifest,
}

impl ChartStore {
    /// Claim `dir` as the output artifact, replacing a previous artifact
    /// if one is there.
    ///
    /// A non-empty directory without a manifest is refused rather than
    /// wiped: it was not written by this tool.
    pub fn create(dir: &Path, run_id: RunId) -> Result<Self, StoreError> {
        if dir.exists() {
            let looks_like_artifact = dir.join(MANIFEST_FILE).exists();
            let is_empty = dir.read_dir()?.next().is_none();
            if !looks_like_artifact && !is_empty {
                return Err(StoreError::NotAnArtifact(dir.to_path_buf()));
            }
            std::fs::remove_dir_all(dir)?;
        }
        std::fs::create_dir_all(dir)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            manifest: ArtifactManifest {
                schema_version: SCHEMA_VERSION.to_string(),
                run_id,
                created_at: chrono::Utc::now().to_rfc3339(),
                tables: Vec::new(),
            },
        })
    }

    /// Write one finalized table under `key`, returning its row count.
    pub fn write_table(&mut self, key: &str, batch: &RecordBatch) -> Result<u64, StoreError> {
        validate_key(key)?;
        if self.manifest.tables.iter().any(|t| t.key == key) {
            return Err(StoreError::InvalidKey(format!(
                "{key:?} was already written in this run"
            )));
        }

        let file_name = format!("{key}.parquet");
        let file = File::create(self.dir.join(&file_name))?;
        let props = WriterProperties::builder()
            .set_compression(Compression::ZSTD(ZstdLevel::default()))
            .build();

        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;

        let rows = batch.num_rows() as u64;
        tracing::info!(key, rows, "wrote table partition");
        self.manifest.tables.push(ManifestEntry {
            key: key.to_string(),
            file: file_name,
            rows,
        });
        Ok(rows)
    }

    /// Seal the artifact by writing the manifest.
    pub fn finish(self) -> Result<ArtifactManifest, StoreError> {
        let json = serde_json::to_string_pretty(&self.manifest)?;
        std::fs::write(self.dir.join(MANIFEST_FILE), json)?;
        Ok(self.manifest)
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let ok = !key.is_empty()
        && !key.contains(['/', '\\'])
        && !key.starts_with('.')
        && key.chars().all(|c| !c.is_control());
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

// ── Readback ────────────────────────────────────────────────────────────

/// Read one table partition back from an artifact directory.
pub fn read_table(dir: &Path, key: &str) -> Result<RecordBatch, StoreError> {
    let path = dir.join(format!("{key}.parquet"));
    if !path.exists() {
        return Err(StoreError::MissingTable {
            key: key.to_string(),
        });
    }

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    let schema = builder.schema().clone();
    let batches = builder.build()?.collect::<Result<Vec<_>, _>>()?;

    if batches.is_empty() {
        Ok(RecordBatch::new_empty(schema))
    } else {
        Ok(arrow::compute::concat_batches(&schema, &batches)?)
    }
}

/// Read an artifact's manifest, rejecting artifacts written by an
/// incompatible schema major version.
pub fn read_manifest(dir: &Path) -> Result<ArtifactManifest, StoreError> {
    let content = std::fs::read_to_string(dir.join(MANIFEST_FILE))?;
    let manifest: ArtifactManifest = serde_json::from_str(&content)?;
    if !vx_common::schema::is_compatible(&manifest.schema_version) {
        return Err(StoreError::IncompatibleSchema {
            version: manifest.schema_version,
        });
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::chart_events_schema;
    use arrow::array::{Float64Array, Int64Array, StringArray, TimestampSecondArray};
    use std::sync::Arc;

    fn sample_batch() -> RecordBatch {
        RecordBatch::try_new(
            chart_events_schema(),
            vec![
                Arc::new(Int64Array::from(vec![10006, 10006])),
                Arc::new(Int64Array::from(vec![200001, 200001])),
                Arc::new(Int64Array::from(vec![220045, 220179])),
                Arc::new(TimestampSecondArray::from(vec![1_000_000, 1_003_600])),
                Arc::new(StringArray::from(vec![Some("88"), Some("120")])),
                Arc::new(Float64Array::from(vec![Some(88.0), Some(120.0)])),
                Arc::new(StringArray::from(vec![Some("bpm"), Some("mmHg")])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_two_key_artifact_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("chart_events");

        let mut store = ChartStore::create(&dir, RunId::new()).unwrap();
        assert_eq!(store.write_table("short", &sample_batch()).unwrap(), 2);
        assert_eq!(store.write_table("long", &sample_batch()).unwrap(), 2);
        let manifest = store.finish().unwrap();

        assert_eq!(manifest.tables.len(), 2);
        assert_eq!(read_manifest(&dir).unwrap(), manifest);

        let short = read_table(&dir, "short").unwrap();
        assert_eq!(short.num_rows(), 2);
        assert_eq!(short.schema(), chart_events_schema());
    }

    #[test]
    fn test_create_overwrites_previous_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("chart_events");

        let mut store = ChartStore::create(&dir, RunId::new()).unwrap();
        store.write_table("short", &sample_batch()).unwrap();
        store.write_table("long", &sample_batch()).unwrap();
        store.finish().unwrap();

        // Second run writes fewer keys; the stale "long" must not survive.
        let mut store = ChartStore::create(&dir, RunId::new()).unwrap();
        store.write_table("short", &sample_batch()).unwrap();
        store.finish().unwrap();

        assert!(read_table(&dir, "short").is_ok());
        assert!(matches!(
            read_table(&dir, "long").unwrap_err(),
            StoreError::MissingTable { .. }
        ));
    }

    #[test]
    fn test_create_refuses_foreign_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("notes");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("important.txt"), "keep me").unwrap();

        let err = ChartStore::create(&dir, RunId::new()).unwrap_err();
        assert!(matches!(err, StoreError::NotAnArtifact(_)));
        assert!(dir.join("important.txt").exists());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("chart_events");

        let mut store = ChartStore::create(&dir, RunId::new()).unwrap();
        store.write_table("short", &sample_batch()).unwrap();
        assert!(store.write_table("short", &sample_batch()).is_err());
    }

    #[test]
    fn test_bad_keys_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("chart_events");
        let mut store = ChartStore::create(&dir, RunId::new()).unwrap();

        for key in ["", "a/b", "..", ".hidden"] {
            assert!(
                matches!(
                    store.write_table(key, &sample_batch()),
                    Err(StoreError::InvalidKey(_))
                ),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_manifest_from_a_future_major_version_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("chart_events");

        let mut store = ChartStore::create(&dir, RunId::new()).unwrap();
        store.write_table("short", &sample_batch()).unwrap();
        let mut manifest = store.finish().unwrap();

        manifest.schema_version = "2.0.0".to_string();
        std::fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_string(&manifest).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            read_manifest(&dir).unwrap_err(),
            StoreError::IncompatibleSchema { .. }
        ));
    }

    #[test]
    fn test_empty_table_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("chart_events");

        let empty = RecordBatch::new_empty(chart_events_schema());
        let mut store = ChartStore::create(&dir, RunId::new()).unwrap();
        assert_eq!(store.write_table("short", &empty).unwrap(), 0);
        store.finish().unwrap();

        let loaded = read_table(&dir, "short").unwrap();
        assert_eq!(loaded.num_rows(), 0);
        assert_eq!(loaded.schema(), chart_events_schema());
    }
}
