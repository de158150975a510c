//! Episode Index: per-stay look-back intervals.
//!
//! Built once from the ventilation-episode table before streaming
//! begins, then held immutable for the whole pass. Only the FIRST
//! episode of each stay anchors intervals; stays without an episode
//! numbered 1 contribute nothing and are thereby excluded from all
//! output.

use arrow::array::{Array, Int64Array, TimestampSecondArray};
use arrow::record_batch::RecordBatch;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::window::{format_secs, Interval};
use vx_common::{Error, Result, StayId};
use vx_config::WindowSpec;
use vx_store::schema::{END_TIME, EPISODE, STAY_ID};

/// Episode sequence number that anchors the look-back windows.
pub const FIRST_EPISODE: i64 = 1;

/// Immutable mapping from stay id to its two derived intervals.
///
/// Interval order matches the window order of the run configuration.
/// Iteration is deterministic: ascending stay id, then window index.
#[derive(Debug, Clone)]
pub struct EpisodeIndex {
    stays: BTreeMap<StayId, [Interval; 2]>,
}

impl EpisodeIndex {
    /// Build the index from the normalized episode table.
    ///
    /// All rows of a stay's first-episode group are expected to carry
    /// one end timestamp; rows that disagree make the table
    /// inconsistent and fail the build. A corrupt episode table must
    /// not silently shift a window.
    pub fn build(episodes: &RecordBatch, windows: &[WindowSpec; 2]) -> Result<Self> {
        let stays = column::<Int64Array>(episodes, STAY_ID)?;
        let sequence = column::<Int64Array>(episodes, EPISODE)?;
        let ends = column::<TimestampSecondArray>(episodes, END_TIME)?;

        // First pass: the authoritative end time per qualifying stay.
        let mut end_by_stay: BTreeMap<StayId, i64> = BTreeMap::new();
        for row in 0..episodes.num_rows() {
            if sequence.value(row) != FIRST_EPISODE {
                continue;
            }
            let stay = StayId(stays.value(row));
            let end = ends.value(row);
            match end_by_stay.entry(stay) {
                Entry::Vacant(slot) => {
                    slot.insert(end);
                }
                Entry::Occupied(slot) => {
                    let first = *slot.get();
                    if first != end {
                        return Err(Error::EpisodeConflict {
                            stay: stay.0,
                            first: format_secs(first),
                            second: format_secs(end),
                        });
                    }
                }
            }
        }

        let stays = end_by_stay
            .into_iter()
            .map(|(stay, end_secs)| {
                let intervals = windows.each_ref().map(|w| {
                    Interval::from_secs(end_secs - w.secs, end_secs)
                });
                (stay, intervals)
            })
            .collect();

        Ok(Self { stays })
    }

    /// Number of stays with a qualifying first episode.
    pub fn len(&self) -> usize {
        self.stays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stays.is_empty()
    }

    /// Intervals for one stay, in window order.
    pub fn get(&self, stay: StayId) -> Option<&[Interval; 2]> {
        self.stays.get(&stay)
    }

    /// Deterministic iteration: ascending stay id.
    pub fn iter(&self) -> impl Iterator<Item = (StayId, &[Interval; 2])> {
        self.stays.iter().map(|(stay, intervals)| (*stay, intervals))
    }
}

/// Fetch a required column with its expected concrete type.
fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| Error::EpisodeTable(format!("missing column {name}")))?;
    if col.null_count() > 0 {
        return Err(Error::EpisodeTable(format!("column {name} contains nulls")));
    }
    col.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::EpisodeTable(format!("column {name} has an unexpected type")))
}
