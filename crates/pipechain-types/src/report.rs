//! PipelineReport — what every stage of a finished pipeline did.

use serde::{Deserialize, Serialize};

use crate::status::StageStatus;

/// How per-stage statuses collapse into one pipeline exit code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitPolicy {
    /// The terminal stage's code, as a plain shell pipeline reports it.
    #[default]
    Terminal,
    /// The rightmost non-zero stage code, or 0 if every stage succeeded.
    Pipefail,
}

/// Result of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutcome {
    /// Zero-based position in the pipeline.
    pub index: usize,
    /// The stage's command line, for diagnostics.
    pub command: String,
    /// OS process ID, if the stage was launched.
    pub pid: Option<u32>,
    /// How the stage ended.
    pub status: StageStatus,
}

impl StageOutcome {
    /// Program name: the first word of the command line.
    pub fn program(&self) -> &str {
        self.command.split_whitespace().next().unwrap_or_default()
    }
}

/// The collected outcome of a whole pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// One outcome per stage, in pipeline order.
    pub stages: Vec<StageOutcome>,
    /// Terminal stage stdout, when the pipeline captured it.
    pub captured: Option<String>,
}

impl PipelineReport {
    /// Outcome of the last stage.
    pub fn terminal(&self) -> Option<&StageOutcome> {
        self.stages.last()
    }

    /// Stages that did not exit 0, in pipeline order.
    pub fn failures(&self) -> impl Iterator<Item = &StageOutcome> {
        self.stages.iter().filter(|s| !s.status.success())
    }

    /// True if every stage exited 0.
    pub fn success(&self) -> bool {
        self.stages.iter().all(|s| s.status.success())
    }

    /// Pipeline exit code under `policy`.
    pub fn code(&self, policy: ExitPolicy) -> i32 {
        match policy {
            ExitPolicy::Terminal => self.terminal().map(|s| s.status.code()).unwrap_or(0),
            ExitPolicy::Pipefail => self
                .stages
                .iter()
                .rev()
                .map(|s| s.status.code())
                .find(|code| *code != 0)
                .unwrap_or(0),
        }
    }

    /// Captured output with surrounding whitespace removed.
    pub fn captured_trimmed(&self) -> Option<&str> {
        self.captured.as_deref().map(str::trim)
    }
}
