//! Ventex configuration loading and validation.
//!
//! This crate provides:
//! - Typed structs for the extraction run configuration
//! - Config resolution (CLI → env → defaults)
//! - Semantic validation before a run starts
//!
//! The run constants the configuration replaces (chunk size, window
//! durations, chunk-count cap) are deliberately NOT process-wide state;
//! the resolved `ExtractConfig` is passed explicitly into the filter.

pub mod extract;
pub mod validate;

pub use extract::{ConfigError, ConfigSource, ExtractConfig, WindowSpec};
pub use validate::{validate, ValidationError};

/// Environment variable consulted when no `--config` flag is given.
pub const CONFIG_ENV_VAR: &str = "VENTEX_CONFIG";
