//! Closed look-back intervals.

use chrono::NaiveDateTime;

/// A closed time interval `[start, end]`, second resolution.
///
/// Both boundaries are inclusive: an event timestamped exactly at either
/// end is inside the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start_secs: i64,
    end_secs: i64,
}

impl Interval {
    /// Interval of `duration` ending at `end`.
    pub fn look_back(end: NaiveDateTime, duration: chrono::Duration) -> Self {
        let end_secs = end.and_utc().timestamp();
        Self {
            start_secs: end_secs - duration.num_seconds(),
            end_secs,
        }
    }

    /// Interval from raw epoch-second bounds.
    pub fn from_secs(start_secs: i64, end_secs: i64) -> Self {
        Self {
            start_secs,
            end_secs,
        }
    }

    pub fn start_secs(&self) -> i64 {
        self.start_secs
    }

    pub fn end_secs(&self) -> i64 {
        self.end_secs
    }

    /// Closed-interval containment test.
    pub fn contains_secs(&self, t: i64) -> bool {
        self.start_secs <= t && t <= self.end_secs
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", format_secs(self.start_secs), format_secs(self.end_secs))
    }
}

/// Render an epoch-second timestamp the way it appears in the source
/// tables (`YYYY-MM-DD HH:MM:SS`); falls back to the raw number when out
/// of range.
pub fn format_secs(secs: i64) -> String {
    match chrono::DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
        None => secs.to_string(),
    }
}
