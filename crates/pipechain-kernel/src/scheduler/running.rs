//! A launched pipeline and the wait that collects every stage's status.

use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout};
use tokio::task::JoinHandle;

use pipechain_types::{PipelineReport, StageOutcome, StageStatus};

use crate::error::{PipelineError, PipelineResult};

use super::stage::{exit_status, signal_name};

/// One stage after launch: a live child, or the reason it never started.
pub(crate) struct RunningStage {
    pub(crate) index: usize,
    pub(crate) command: String,
    pub(crate) handle: StageHandle,
}

pub(crate) enum StageHandle {
    Live(Child),
    Failed(StageStatus),
}

impl RunningStage {
    fn pid(&self) -> Option<u32> {
        match &self.handle {
            StageHandle::Live(child) => child.id(),
            StageHandle::Failed(_) => None,
        }
    }
}

/// Every stage of a pipeline, launched and wired.
///
/// The supervisor holds no channel endpoints at this point; only the
/// children do. Dropping this without calling [`wait`](Self::wait) leaves
/// the children running unsupervised.
pub struct RunningPipeline {
    stages: Vec<RunningStage>,
    capture: Option<ChildStdout>,
    capture_requested: bool,
}

impl RunningPipeline {
    pub(crate) fn new(stages: Vec<RunningStage>, capture_requested: bool) -> Self {
        Self {
            stages,
            capture: None,
            capture_requested,
        }
    }

    pub(crate) fn push(&mut self, stage: RunningStage) {
        self.stages.push(stage);
    }

    pub(crate) fn set_capture(&mut self, stdout: Option<ChildStdout>) {
        self.capture = stdout;
    }

    /// Number of stages, launched or not.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True if no stage has been launched.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Process IDs of the stages that started, in pipeline order.
    pub fn pids(&self) -> Vec<u32> {
        self.stages.iter().filter_map(RunningStage::pid).collect()
    }

    /// Wait for every stage and collect their statuses.
    ///
    /// Captured output is drained concurrently, so a terminal stage that
    /// fills the pipe cannot stall the wait. Every child is reaped even if
    /// waiting on an earlier one fails; the first such failure is returned.
    pub async fn wait(mut self) -> PipelineResult<PipelineReport> {
        let drain = self.capture.take().map(spawn_drain);

        let mut outcomes = Vec::with_capacity(self.stages.len());
        let mut wait_error = None;

        for stage in self.stages {
            let pid = stage.pid();
            let status = match stage.handle {
                StageHandle::Failed(status) => status,
                StageHandle::Live(mut child) => match child.wait().await {
                    Ok(status) => exit_status(status),
                    Err(source) => {
                        if wait_error.is_none() {
                            wait_error = Some(PipelineError::Wait {
                                index: stage.index,
                                command: stage.command.clone(),
                                source,
                            });
                        }
                        continue;
                    }
                },
            };

            log_outcome(stage.index, &stage.command, &status);
            outcomes.push(StageOutcome {
                index: stage.index,
                command: stage.command,
                pid,
                status,
            });
        }

        let captured = match drain {
            Some(task) => {
                let bytes = task
                    .await
                    .map_err(|e| PipelineError::Capture(std::io::Error::other(e)))?
                    .map_err(PipelineError::Capture)?;
                Some(String::from_utf8_lossy(&bytes).into_owned())
            }
            None if self.capture_requested => Some(String::new()),
            None => None,
        };

        if let Some(err) = wait_error {
            return Err(err);
        }

        Ok(PipelineReport {
            stages: outcomes,
            captured,
        })
    }
}

fn spawn_drain(mut stdout: ChildStdout) -> JoinHandle<std::io::Result<Vec<u8>>> {
    tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).await?;
        Ok(buf)
    })
}

fn log_outcome(index: usize, command: &str, status: &StageStatus) {
    match status {
        StageStatus::Exited(0) => {
            tracing::debug!(stage = index, command, "stage finished");
        }
        StageStatus::Exited(code) => {
            tracing::warn!(stage = index, command, code, "stage exited non-zero");
        }
        StageStatus::Signaled(signal) => {
            tracing::warn!(
                stage = index,
                command,
                signal = %signal_name(*signal),
                "stage killed by signal"
            );
        }
        StageStatus::SpawnFailed { reason, .. } => {
            tracing::warn!(stage = index, command, reason = %reason, "stage failed to start");
        }
    }
}
