//! Supervisor configuration.

use pipechain_types::ExitPolicy;

use crate::scheduler::{PipelineInput, PipelineOutput};
use crate::template::ProcessCountTemplate;

/// Configuration for a [`Supervisor`](crate::Supervisor).
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Name of this supervisor (for identification in logs).
    pub name: String,

    /// How stage statuses collapse into the exit code.
    ///
    /// `Terminal` (default) reports what the line counter did, so a term
    /// that matches nothing still exits 0 with a count of 0.
    pub exit_policy: ExitPolicy,

    /// The stages to run for a term.
    pub template: ProcessCountTemplate,

    /// Where the listing stage reads from.
    pub stdin: PipelineInput,

    /// Where the counting stage writes to.
    pub stdout: PipelineOutput,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            name: "processes".to_string(),
            exit_policy: ExitPolicy::Terminal,
            template: ProcessCountTemplate::default(),
            stdin: PipelineInput::Inherit,
            stdout: PipelineOutput::Inherit,
        }
    }
}

impl SupervisorConfig {
    /// Like the default, but any failing stage fails the run.
    pub fn pipefail() -> Self {
        Self {
            name: "pipefail".to_string(),
            exit_policy: ExitPolicy::Pipefail,
            ..Self::default()
        }
    }

    /// Detached from the terminal: empty stdin, count captured in the report.
    ///
    /// Useful for embedding and tests.
    pub fn captured() -> Self {
        Self {
            name: "captured".to_string(),
            stdin: PipelineInput::Null,
            stdout: PipelineOutput::Capture,
            ..Self::default()
        }
    }

    /// Set the template.
    pub fn with_template(mut self, template: ProcessCountTemplate) -> Self {
        self.template = template;
        self
    }

    /// Set the exit policy.
    pub fn with_exit_policy(mut self, policy: ExitPolicy) -> Self {
        self.exit_policy = policy;
        self
    }
}
