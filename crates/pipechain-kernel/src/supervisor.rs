//! The supervisor: builds the process-count pipeline for a term and waits.

use std::ffi::OsStr;

use pipechain_types::PipelineReport;

use crate::config::SupervisorConfig;
use crate::error::PipelineResult;
use crate::scheduler::PipelineBuilder;

/// Runs the configured template for a term and reports how it went.
#[derive(Debug, Clone, Default)]
pub struct Supervisor {
    config: SupervisorConfig,
}

impl Supervisor {
    /// Create a supervisor with the given config.
    pub fn new(config: SupervisorConfig) -> Self {
        Self { config }
    }

    /// The supervisor's config.
    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// The pipeline that [`run`](Self::run) would launch for `term`.
    pub fn builder(&self, term: impl AsRef<OsStr>) -> PipelineResult<PipelineBuilder> {
        Ok(PipelineBuilder::new(self.config.template.stages(term.as_ref()))?
            .stdin(self.config.stdin)
            .stdout(self.config.stdout))
    }

    /// Launch the pipeline for `term` and wait for all of its stages.
    #[tracing::instrument(
        level = "info",
        skip(self, term),
        fields(name = %self.config.name, term = ?term.as_ref()),
        err
    )]
    pub async fn run(&self, term: impl AsRef<OsStr>) -> PipelineResult<PipelineReport> {
        let report = self.builder(term)?.run().await?;
        tracing::info!(
            code = self.exit_code(&report),
            failed = report.failures().count(),
            "pipeline finished"
        );
        Ok(report)
    }

    /// Exit code for `report` under the configured policy.
    pub fn exit_code(&self, report: &PipelineReport) -> i32 {
        report.code(self.config.exit_policy)
    }
}
