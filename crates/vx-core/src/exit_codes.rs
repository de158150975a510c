//! Exit codes for the vx-core CLI.
//!
//! Exit codes communicate run outcome without requiring log parsing.

use vx_common::Error;

/// Exit codes for vx-core runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Run completed and the artifact was sealed
    Clean = 0,

    /// Configuration error
    ConfigError = 10,

    /// Episode table / index construction error
    EpisodeError = 11,

    /// Event scan or finalize error
    ExtractionError = 12,

    /// I/O or artifact store error
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err.code() {
            10..=19 => ExitCode::ConfigError,
            20..=29 => ExitCode::EpisodeError,
            30..=39 => ExitCode::ExtractionError,
            40..=49 | 60..=69 => ExitCode::IoError,
            _ => ExitCode::InternalError,
        }
    }
}
