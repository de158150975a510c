//! Extraction run configuration.
//!
//! These types replace the module-level constants of earlier pipeline
//! revisions (chunk size, window durations, chunk cap) with one explicit
//! structure resolved before the run starts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::CONFIG_ENV_VAR;

// ── Window specifications ───────────────────────────────────────────────

/// A named, fixed look-back duration anchored at an episode's end time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Name of the window; also the output partition key.
    pub name: String,
    /// Look-back duration in seconds.
    pub secs: i64,
}

impl WindowSpec {
    pub fn new(name: impl Into<String>, secs: i64) -> Self {
        Self {
            name: name.into(),
            secs,
        }
    }

    /// Convenience constructor for whole-hour windows.
    pub fn from_hours(name: impl Into<String>, hours: i64) -> Self {
        Self::new(name, hours * 3600)
    }

    /// The window's duration.
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.secs)
    }
}

// ── Run configuration ───────────────────────────────────────────────────

/// Complete configuration for one extraction run.
///
/// Exactly two windows are active per run; this is encoded in the type
/// rather than validated at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Number of event rows materialized per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Cap on the number of chunks consumed; `None` processes the whole
    /// source. A capped run still finalizes and persists what it has
    /// accumulated (documented partial-run mode for sampling/testing).
    #[serde(default)]
    pub max_chunks: Option<u64>,

    /// The two active look-back windows, in output order.
    #[serde(default = "default_windows")]
    pub windows: [WindowSpec; 2],

    /// Optional total-row count of the event source, used only to log a
    /// chunk-count estimate alongside progress. The run itself never
    /// depends on it.
    #[serde(default)]
    pub total_rows_hint: Option<u64>,
}

fn default_chunk_size() -> usize {
    1_000_000
}

fn default_windows() -> [WindowSpec; 2] {
    [
        WindowSpec::from_hours("short", 2),
        WindowSpec::from_hours("long", 6),
    ]
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_chunks: None,
            windows: default_windows(),
            total_rows_hint: None,
        }
    }
}

/// Where the resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CliFlag(PathBuf),
    EnvVar(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliFlag(p) => write!(f, "--config {}", p.display()),
            ConfigSource::EnvVar(p) => {
                write!(f, "{}={}", CONFIG_ENV_VAR, p.display())
            }
            ConfigSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ExtractConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the configuration: explicit CLI path, then the
    /// `VENTEX_CONFIG` environment variable, then built-in defaults.
    pub fn resolve(cli_path: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        if let Some(path) = cli_path {
            let cfg = Self::from_file(path)?;
            return Ok((cfg, ConfigSource::CliFlag(path.to_path_buf())));
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            let cfg = Self::from_file(&path)?;
            return Ok((cfg, ConfigSource::EnvVar(path)));
        }

        Ok((Self::default(), ConfigSource::Defaults))
    }

    /// Chunk-count estimate for progress logging, when a row hint is set.
    pub fn chunk_estimate(&self) -> Option<u64> {
        self.total_rows_hint
            .map(|rows| rows.div_ceil(self.chunk_size as u64))
    }
}
