//! Per-window result collectors.
//!
//! A collector is append-only while the stream runs; fragments are
//! concatenated and the id columns coerced to integers exactly once, at
//! finalize. Coercing earlier would fail on chunks where streaming left
//! missing values in a float-typed id column.

use arrow::compute::{cast_with_options, concat_batches, CastOptions};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use arrow::util::display::FormatOptions;

use vx_common::{Error, Result};
use vx_store::schema::{chart_events_schema, ID_COLUMNS};

/// Growable accumulator for one window's matched events.
pub struct ResultCollector {
    window: String,
    fragments: Vec<RecordBatch>,
    rows: u64,
}

impl ResultCollector {
    pub fn new(window: impl Into<String>) -> Self {
        Self {
            window: window.into(),
            fragments: Vec::new(),
            rows: 0,
        }
    }

    /// Window name this collector accumulates for.
    pub fn window(&self) -> &str {
        &self.window
    }

    /// Rows appended so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Append one matched group of rows. Empty groups are dropped.
    pub fn append(&mut self, group: RecordBatch) {
        if group.num_rows() == 0 {
            return;
        }
        self.rows += group.num_rows() as u64;
        self.fragments.push(group);
    }

    /// Concatenate all fragments into one table and coerce the id
    /// columns to Int64.
    ///
    /// Zero matches is a valid outcome: the finalized table is empty
    /// but well-formed, and a warning is logged.
    pub fn finalize(self) -> Result<RecordBatch> {
        let target = chart_events_schema();

        if self.fragments.is_empty() {
            tracing::warn!(window = %self.window, "no events matched; emitting empty table");
            return Ok(RecordBatch::new_empty(target));
        }

        let combined = concat_batches(&self.fragments[0].schema(), &self.fragments)
            .map_err(|e| self.finalize_err(e))?;

        // A null or NaN id at this point means a matched row without a
        // usable identity; that fails the run rather than rounding to a
        // fabricated id.
        let cast_options = CastOptions {
            safe: false,
            format_options: FormatOptions::default(),
        };

        let mut columns = Vec::with_capacity(target.fields().len());
        for field in target.fields() {
            let col = combined.column_by_name(field.name()).ok_or_else(|| {
                Error::Finalize {
                    window: self.window.clone(),
                    reason: format!("missing column {}", field.name()),
                }
            })?;

            if ID_COLUMNS.contains(&field.name().as_str()) {
                let coerced = cast_with_options(col, &DataType::Int64, &cast_options)
                    .map_err(|e| self.finalize_err(e))?;
                columns.push(coerced);
            } else {
                columns.push(col.clone());
            }
        }

        RecordBatch::try_new(target, columns).map_err(|e| self.finalize_err(e))
    }

    fn finalize_err(&self, e: arrow::error::ArrowError) -> Error {
        Error::Finalize {
            window: self.window.clone(),
            reason: e.to_string(),
        }
    }
}
