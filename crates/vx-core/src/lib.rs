//! Ventex core extraction engine.
//!
//! This crate implements the one-pass extraction over the chart-event
//! stream:
//! - [`EpisodeIndex`]: per-stay look-back intervals derived from the
//!   first ventilation episode, built once and held for the run
//! - [`WindowFilter`]: consumes bounded event chunks and routes matching
//!   rows into per-window collectors
//! - [`ResultCollector`]: append-only fragment accumulation with a
//!   single finalize (concat + id coercion)
//!
//! The `vx-core` binary wires these to the CSV source and the Parquet
//! artifact writer from `vx-store`.

pub mod collector;
pub mod episodes;
pub mod exit_codes;
pub mod filter;
pub mod window;

pub use collector::ResultCollector;
pub use episodes::EpisodeIndex;
pub use exit_codes::ExitCode;
pub use filter::{ScanOutcome, ScanStats, WindowFilter};
pub use window::Interval;
