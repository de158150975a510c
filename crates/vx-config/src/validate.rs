//! Semantic validation of a resolved configuration.
//!
//! Validation runs once, before the episode table is touched; a run never
//! starts with a config that can produce degenerate intervals or an
//! unusable artifact layout.

use crate::extract::ExtractConfig;

/// A single validation failure, pointing at the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every failure rather than
/// stopping at the first.
pub fn validate(cfg: &ExtractConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if cfg.chunk_size == 0 {
        errors.push(ValidationError {
            field: "chunk_size".into(),
            message: "must be at least 1".into(),
        });
    }

    if cfg.max_chunks == Some(0) {
        errors.push(ValidationError {
            field: "max_chunks".into(),
            message: "a capped run must allow at least 1 chunk".into(),
        });
    }

    for (i, window) in cfg.windows.iter().enumerate() {
        if window.name.trim().is_empty() {
            errors.push(ValidationError {
                field: format!("windows[{i}].name"),
                message: "window name must be non-empty (it keys the output partition)".into(),
            });
        }
        if window.secs <= 0 {
            errors.push(ValidationError {
                field: format!("windows[{i}].secs"),
                message: format!("duration must be positive, got {}", window.secs),
            });
        }
    }

    if cfg.windows[0].name == cfg.windows[1].name {
        errors.push(ValidationError {
            field: "windows".into(),
            message: format!(
                "window names must be distinct, both are {:?}",
                cfg.windows[0].name
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
