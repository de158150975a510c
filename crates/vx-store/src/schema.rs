//! Arrow schema definitions for the event and episode tables.
//!
//! Column names follow the source tables verbatim (MIMIC-style upper
//! case); Rust identifiers stay snake_case.
//!
//! Two schemas exist for chart events. During streaming the three id
//! columns are nullable Float64: chunk boundaries can surface missing
//! values, and coercing ids mid-stream would fail on such chunks. The
//! finalized schema carries Int64 ids and is produced exactly once,
//! after the last chunk.

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use std::sync::Arc;

/// Patient/subject id column.
pub const SUBJECT_ID: &str = "SUBJECT_ID";
/// ICU stay id column.
pub const STAY_ID: &str = "ICUSTAY_ID";
/// Charted item id column.
pub const ITEM_ID: &str = "ITEMID";
/// Observation timestamp column.
pub const CHART_TIME: &str = "CHARTTIME";
/// Raw charted value column.
pub const VALUE: &str = "VALUE";
/// Numeric charted value column.
pub const VALUE_NUM: &str = "VALUENUM";
/// Unit-of-measure column.
pub const VALUE_UOM: &str = "VALUEUOM";

/// Episode sequence number column (1-based per stay).
pub const EPISODE: &str = "EPISODE";
/// Episode end timestamp column.
pub const END_TIME: &str = "ENDTIME";

/// The event columns consumed by the extraction, in output order.
pub const EVENT_COLUMNS: [&str; 7] = [
    SUBJECT_ID, STAY_ID, ITEM_ID, CHART_TIME, VALUE, VALUE_NUM, VALUE_UOM,
];

/// The columns coerced to integer at finalize.
pub const ID_COLUMNS: [&str; 3] = [SUBJECT_ID, STAY_ID, ITEM_ID];

/// Timestamps are naive (no zone) second-resolution, as charted.
pub fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Second, None)
}

/// Schema of chart-event chunks while streaming: ids as nullable floats.
pub fn chart_events_streaming_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(SUBJECT_ID, DataType::Float64, true),
        Field::new(STAY_ID, DataType::Float64, true),
        Field::new(ITEM_ID, DataType::Float64, true),
        Field::new(CHART_TIME, timestamp_type(), false),
        Field::new(VALUE, DataType::Utf8, true),
        Field::new(VALUE_NUM, DataType::Float64, true),
        Field::new(VALUE_UOM, DataType::Utf8, true),
    ]))
}

/// Schema of the finalized, persisted chart-event tables.
pub fn chart_events_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(SUBJECT_ID, DataType::Int64, false),
        Field::new(STAY_ID, DataType::Int64, false),
        Field::new(ITEM_ID, DataType::Int64, false),
        Field::new(CHART_TIME, timestamp_type(), false),
        Field::new(VALUE, DataType::Utf8, true),
        Field::new(VALUE_NUM, DataType::Float64, true),
        Field::new(VALUE_UOM, DataType::Utf8, true),
    ]))
}

/// Canonical schema of the ventilation-episode table after load.
pub fn episodes_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(STAY_ID, DataType::Int64, false),
        Field::new(EPISODE, DataType::Int64, false),
        Field::new(END_TIME, timestamp_type(), false),
    ]))
}

/// Streaming-side field for a named event column.
///
/// Returns `None` for columns the extraction does not consume.
pub fn streaming_field(name: &str) -> Option<Field> {
    let schema = chart_events_streaming_schema();
    schema.field_with_name(name).ok().cloned()
}
