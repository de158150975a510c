//! Shared fixtures for the vx-core integration suites.

#![allow(dead_code)]

use arrow::array::{Float64Array, Int64Array, StringArray, TimestampSecondArray};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use vx_store::schema::{chart_events_streaming_schema, episodes_schema, CHART_TIME, STAY_ID};

/// Parse a source-style timestamp into epoch seconds.
pub fn ts(s: &str) -> i64 {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap()
        .and_utc()
        .timestamp()
}

/// One event row of the CSV fixture: (subject, stay, item, charttime).
/// A `None` stay renders as an empty field.
pub struct EventRow {
    pub subject: i64,
    pub stay: Option<i64>,
    pub item: i64,
    pub charttime: String,
}

impl EventRow {
    pub fn new(subject: i64, stay: Option<i64>, item: i64, charttime: &str) -> Self {
        Self {
            subject,
            stay,
            item,
            charttime: charttime.to_string(),
        }
    }
}

/// Write a CHARTEVENTS-shaped CSV, extra columns included, the way the
/// source system dumps it.
pub fn write_events_csv(path: &Path, rows: &[EventRow]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(
        file,
        "ROW_ID,SUBJECT_ID,HADM_ID,ICUSTAY_ID,ITEMID,CHARTTIME,STORETIME,VALUE,VALUENUM,VALUEUOM"
    )
    .unwrap();
    for (i, row) in rows.iter().enumerate() {
        let stay = row
            .stay
            .map(|s| s.to_string())
            .unwrap_or_default();
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{}",
            i + 1,
            row.subject,
            100000 + i,
            stay,
            row.item,
            row.charttime,
            row.charttime,
            "88",
            "88",
            "bpm"
        )
        .unwrap();
    }
}

/// Write a ventilation-episode Parquet table: (stay, episode, endtime).
pub fn write_episodes_parquet(path: &Path, rows: &[(i64, i64, &str)]) {
    let schema = episodes_schema();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.0).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.1).collect::<Vec<_>>(),
            )),
            Arc::new(TimestampSecondArray::from(
                rows.iter().map(|r| ts(r.2)).collect::<Vec<_>>(),
            )),
        ],
    )
    .unwrap();

    let file = std::fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// Build an in-memory streaming chunk from (stay, epoch-seconds) pairs.
pub fn streaming_chunk(rows: &[(i64, i64)]) -> RecordBatch {
    let n = rows.len();
    RecordBatch::try_new(
        chart_events_streaming_schema(),
        vec![
            Arc::new(Float64Array::from(vec![Some(10006.0); n])),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| Some(r.0 as f64)).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(vec![Some(220045.0); n])),
            Arc::new(TimestampSecondArray::from(
                rows.iter().map(|r| r.1).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(vec![Some("88"); n])),
            Arc::new(Float64Array::from(vec![Some(88.0); n])),
            Arc::new(StringArray::from(vec![Some("bpm"); n])),
        ],
    )
    .unwrap()
}

/// The (stay, charttime) rows of a finalized table, sorted.
///
/// Multiplicity is preserved: the same observation twice in the source
/// must appear twice in the result.
pub fn matched_rows(table: &RecordBatch) -> Vec<(i64, i64)> {
    let stays = table
        .column_by_name(STAY_ID)
        .unwrap()
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    let times = table
        .column_by_name(CHART_TIME)
        .unwrap()
        .as_any()
        .downcast_ref::<TimestampSecondArray>()
        .unwrap();

    let mut rows: Vec<(i64, i64)> = (0..table.num_rows())
        .map(|i| (stays.value(i), times.value(i)))
        .collect();
    rows.sort_unstable();
    rows
}
