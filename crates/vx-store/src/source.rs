//! Input readers: the chunked CSV event source and the episode table.
//!
//! The event source is the memory-ceiling discipline of the whole run.
//! `CsvChunks` materializes exactly one bounded `RecordBatch` at a time;
//! the stream is restartable only by reopening the file, and there is no
//! mid-stream seek. The episode table, by contrast, is small and read
//! fully into one batch.

use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StoreError;
use crate::schema::{episodes_schema, streaming_field, EVENT_COLUMNS};

// ── Chunked CSV event source ────────────────────────────────────────────

/// Lazy, finite sequence of bounded chart-event chunks.
///
/// Each chunk is parsed with the streaming schema (timestamps as
/// date-times, ids as nullable floats, everything else natural). A row
/// that fails parsing surfaces as an `Err` item, which callers treat as
/// fatal; there is no partial-chunk recovery.
#[derive(Debug)]
pub struct CsvChunks {
    path: PathBuf,
    reader: arrow::csv::Reader<File>,
}

impl CsvChunks {
    /// Open an event CSV and prepare chunked reading.
    ///
    /// The header is read first to locate the consumed columns; columns
    /// outside [`EVENT_COLUMNS`] are ignored via projection. A missing
    /// required column fails here, before any chunk is produced.
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self, StoreError> {
        let header = read_header(path)?;
        let (file_schema, projection) = build_file_schema(path, &header)?;

        let reader = ReaderBuilder::new(Arc::new(file_schema))
            .with_header(true)
            .with_batch_size(chunk_size)
            .with_projection(projection)
            .build(File::open(path)?)?;

        Ok(Self {
            path: path.to_path_buf(),
            reader,
        })
    }

    /// The source file backing this stream.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for CsvChunks {
    type Item = Result<RecordBatch, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next().map(|r| r.map_err(StoreError::from))
    }
}

/// Read the header row of a delimited file.
fn read_header(path: &Path) -> Result<Vec<String>, StoreError> {
    let file = File::open(path)?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line)?;

    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Err(StoreError::EmptyHeader {
            path: path.to_path_buf(),
        });
    }

    Ok(line
        .split(',')
        .map(|c| c.trim().trim_matches('"').to_string())
        .collect())
}

/// Build the full-file schema plus the projection selecting the consumed
/// columns in canonical order.
///
/// Unconsumed columns are declared Utf8; the projection means they are
/// never parsed.
fn build_file_schema(
    path: &Path,
    header: &[String],
) -> Result<(Schema, Vec<usize>), StoreError> {
    let fields: Vec<Field> = header
        .iter()
        .map(|name| {
            streaming_field(name)
                .unwrap_or_else(|| Field::new(name.as_str(), DataType::Utf8, true))
        })
        .collect();

    let mut projection = Vec::with_capacity(EVENT_COLUMNS.len());
    for required in EVENT_COLUMNS {
        let idx = header.iter().position(|h| h == required).ok_or_else(|| {
            StoreError::MissingColumn {
                table: format!("event source {}", path.display()),
                column: required.to_string(),
            }
        })?;
        projection.push(idx);
    }

    Ok((Schema::new(fields), projection))
}

// ── Episode table ───────────────────────────────────────────────────────

/// Read the precomputed ventilation-episode Parquet table fully into
/// memory, normalized to [`episodes_schema`].
///
/// Required columns: `ICUSTAY_ID`, `EPISODE`, `ENDTIME`; anything else
/// the upstream step wrote is dropped. Id and episode columns are cast
/// to Int64 and the end time to second-resolution timestamps, so the
/// index builder never sees upstream type drift.
pub fn read_episode_table(path: &Path) -> Result<RecordBatch, StoreError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let file_schema = builder.schema().clone();
    let reader = builder.build()?;

    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    let combined = if batches.is_empty() {
        RecordBatch::new_empty(file_schema)
    } else {
        arrow::compute::concat_batches(&file_schema, &batches)?
    };

    normalize_episodes(&combined)
}

fn normalize_episodes(batch: &RecordBatch) -> Result<RecordBatch, StoreError> {
    let target = episodes_schema();
    let mut columns = Vec::with_capacity(target.fields().len());

    for field in target.fields() {
        let col = batch.column_by_name(field.name()).ok_or_else(|| {
            StoreError::MissingColumn {
                table: "episodes".to_string(),
                column: field.name().to_string(),
            }
        })?;
        columns.push(arrow::compute::cast(col, field.data_type())?);
    }

    Ok(RecordBatch::try_new(target, columns)?)
}
