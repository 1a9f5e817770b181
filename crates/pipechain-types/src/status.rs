//! How a single stage ended.

use serde::{Deserialize, Serialize};

/// Exit code reported for a stage whose command could not be found.
pub const CODE_NOT_FOUND: i32 = 127;

/// Exit code reported for a stage whose command was found but could not run.
pub const CODE_CANNOT_EXECUTE: i32 = 126;

/// Final status of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageStatus {
    /// The command ran and exited with this code.
    Exited(i32),
    /// The command was terminated by this signal number.
    Signaled(i32),
    /// The command never started (not found, not executable, ...).
    SpawnFailed {
        /// Shell-style code: 127 for not found, 126 otherwise.
        code: i32,
        /// OS reason, for the diagnostic.
        reason: String,
    },
}

impl StageStatus {
    /// Shell-style exit code: signals map to `128 + signal`.
    pub fn code(&self) -> i32 {
        match self {
            StageStatus::Exited(code) => *code,
            StageStatus::Signaled(signal) => 128 + signal,
            StageStatus::SpawnFailed { code, .. } => *code,
        }
    }

    /// True if the stage ran and exited 0.
    pub fn success(&self) -> bool {
        matches!(self, StageStatus::Exited(0))
    }

    /// True if the stage's command was never started.
    pub fn never_started(&self) -> bool {
        matches!(self, StageStatus::SpawnFailed { .. })
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Exited(code) => write!(f, "exited with status {}", code),
            StageStatus::Signaled(signal) => write!(f, "terminated by signal {}", signal),
            StageStatus::SpawnFailed { reason, .. } => write!(f, "failed to start: {}", reason),
        }
    }
}
