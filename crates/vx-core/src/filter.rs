//! Streaming Window Filter.
//!
//! Consumes the event source as a lazy sequence of bounded chunks and
//! routes rows into per-window collectors:
//!
//! ```text
//! chunks ──► WindowFilter::run()
//!                │  per chunk, per indexed stay:
//!                │    stay mask ∧ (lower <= CHARTTIME <= upper)
//!                ├─ window[0] collector ──► finalize ──► table
//!                └─ window[1] collector ──► finalize ──► table
//! ```
//!
//! Exactly one chunk is resident at a time; each is fully filtered and
//! dropped before the next is pulled. Interval membership is a function
//! of the timestamp alone, so rows sharing a timestamp are always routed
//! together (all-or-nothing per timestamp).

use arrow::array::{Float64Array, Scalar, TimestampSecondArray};
use arrow::compute::kernels::cmp::{eq, gt_eq, lt_eq};
use arrow::compute::{and, filter_record_batch};
use arrow::record_batch::RecordBatch;
use std::fmt;

use crate::collector::ResultCollector;
use crate::episodes::EpisodeIndex;
use vx_common::{Error, Result};
use vx_config::ExtractConfig;
use vx_store::schema::{CHART_TIME, STAY_ID};

/// Counters accumulated over one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub chunks_processed: u64,
    pub rows_scanned: u64,
    /// Matched rows per window, in configuration order.
    pub rows_matched: [u64; 2],
    /// True when the scan stopped at the configured chunk cap rather
    /// than at the end of the source (partial-run mode).
    pub capped: bool,
}

/// Finalized tables plus scan counters.
#[derive(Debug)]
pub struct ScanOutcome {
    /// One finalized table per window, in configuration order.
    pub tables: [RecordBatch; 2],
    pub stats: ScanStats,
}

/// One-pass filter of an event stream against the Episode Index.
pub struct WindowFilter {
    index: EpisodeIndex,
    config: ExtractConfig,
}

impl WindowFilter {
    pub fn new(index: EpisodeIndex, config: ExtractConfig) -> Self {
        Self { index, config }
    }

    /// Drive the stream to completion (or to the chunk cap) and
    /// finalize both result sets.
    ///
    /// A chunk that fails to materialize aborts the run: local file
    /// reads are not retryable circumstances, and a partially-parsed
    /// source must not produce output.
    pub fn run<I, E>(self, chunks: I) -> Result<ScanOutcome>
    where
        I: IntoIterator<Item = std::result::Result<RecordBatch, E>>,
        E: fmt::Display,
    {
        let mut collectors = self
            .config
            .windows
            .each_ref()
            .map(|w| ResultCollector::new(w.name.clone()));
        let estimate = self.config.chunk_estimate();
        let cap = self.config.max_chunks;
        let mut stats = ScanStats::default();

        tracing::info!(
            stays = self.index.len(),
            chunk_size = self.config.chunk_size,
            "extracting relevant chart events"
        );

        let mut iter = chunks.into_iter();
        // The cap is checked before pulling: a capped run must not
        // materialize the chunk after the cap.
        while cap.is_none_or(|cap| stats.chunks_processed < cap) {
            let Some(item) = iter.next() else { break };
            let batch = item.map_err(|e| Error::EventSource(e.to_string()))?;

            stats.chunks_processed += 1;
            stats.rows_scanned += batch.num_rows() as u64;
            match estimate {
                Some(total) => tracing::info!(
                    chunk = stats.chunks_processed,
                    of = total,
                    rows = batch.num_rows(),
                    "processing chunk"
                ),
                None => tracing::info!(
                    chunk = stats.chunks_processed,
                    rows = batch.num_rows(),
                    "processing chunk"
                ),
            }

            self.process_chunk(&batch, &mut collectors)?;
        }

        if cap.is_some_and(|cap| stats.chunks_processed == cap) {
            stats.capped = true;
            tracing::warn!(
                chunks = stats.chunks_processed,
                "chunk cap reached; finalizing a partial run"
            );
        }

        let [first, second] = collectors;
        stats.rows_matched = [first.rows(), second.rows()];
        for (window, rows) in self.config.windows.iter().zip(stats.rows_matched) {
            tracing::info!(window = %window.name, rows, "window result set");
        }

        let tables = [first.finalize()?, second.finalize()?];
        Ok(ScanOutcome { tables, stats })
    }

    /// Filter one chunk against every indexed stay.
    ///
    /// Iteration order is the index's: ascending stay id, then window
    /// index, deterministic regardless of input order.
    fn process_chunk(
        &self,
        batch: &RecordBatch,
        collectors: &mut [ResultCollector; 2],
    ) -> Result<()> {
        let stay_col = batch.column_by_name(STAY_ID).ok_or_else(|| {
            Error::Extraction(format!("chunk is missing column {STAY_ID}"))
        })?;
        let time_col = batch.column_by_name(CHART_TIME).ok_or_else(|| {
            Error::Extraction(format!("chunk is missing column {CHART_TIME}"))
        })?;

        for (stay, intervals) in self.index.iter() {
            let stay_scalar = Scalar::new(Float64Array::from(vec![stay.0 as f64]));
            let stay_mask = eq(stay_col, &stay_scalar).map_err(chunk_err)?;
            if stay_mask.true_count() == 0 {
                continue;
            }

            for (w, interval) in intervals.iter().enumerate() {
                let lower = Scalar::new(TimestampSecondArray::from(vec![interval.start_secs()]));
                let upper = Scalar::new(TimestampSecondArray::from(vec![interval.end_secs()]));

                // closed on both ends
                let after = gt_eq(time_col, &lower).map_err(chunk_err)?;
                let before = lt_eq(time_col, &upper).map_err(chunk_err)?;
                let in_window = and(&after, &before).map_err(chunk_err)?;
                let mask = and(&stay_mask, &in_window).map_err(chunk_err)?;

                if mask.true_count() == 0 {
                    continue;
                }
                let group = filter_record_batch(batch, &mask).map_err(chunk_err)?;
                collectors[w].append(group);
            }
        }

        Ok(())
    }
}

fn chunk_err(e: arrow::error::ArrowError) -> Error {
    Error::Extraction(e.to_string())
}
