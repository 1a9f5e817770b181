//! Pipeline construction.
//!
//! Every stage is a direct child of the supervisor. Stage `i` reads from the
//! channel opened before stage `i - 1` was spawned and writes into a channel
//! opened just before it is spawned itself. Each endpoint is moved into the
//! stage that owns it, so at most one read end (the one waiting for the next
//! stage) is open in the supervisor between spawns.

use pipechain_types::{PipelineReport, StageSpec};

use crate::channel::{Channel, ReadEnd};
use crate::error::{PipelineError, PipelineResult};

use super::running::{RunningPipeline, RunningStage, StageHandle};
use super::stage::{spawn_failure, spawn_stage, StageInput, StageOutput};

/// Where the first stage reads from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipelineInput {
    /// The supervisor's stdin.
    #[default]
    Inherit,
    /// An empty stream.
    Null,
}

/// Where the last stage writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipelineOutput {
    /// The supervisor's stdout.
    #[default]
    Inherit,
    /// Collected into [`PipelineReport::captured`].
    Capture,
}

/// Builds and launches a linear pipeline of external commands.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    stages: Vec<StageSpec>,
    stdin: PipelineInput,
    stdout: PipelineOutput,
}

impl PipelineBuilder {
    /// Create a builder for `stages`, which must not be empty.
    pub fn new(stages: Vec<StageSpec>) -> PipelineResult<Self> {
        if stages.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }
        Ok(Self {
            stages,
            stdin: PipelineInput::default(),
            stdout: PipelineOutput::default(),
        })
    }

    /// Create a builder from `a x | b y | c` text.
    pub fn parse(text: &str) -> PipelineResult<Self> {
        Self::new(StageSpec::parse_pipeline(text)?)
    }

    /// Set where the first stage reads from.
    pub fn stdin(mut self, input: PipelineInput) -> Self {
        self.stdin = input;
        self
    }

    /// Set where the last stage writes to.
    pub fn stdout(mut self, output: PipelineOutput) -> Self {
        self.stdout = output;
        self
    }

    /// The stages, in order.
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Launch the pipeline and wait for every stage.
    pub async fn run(&self) -> PipelineResult<PipelineReport> {
        self.spawn().await?.wait().await
    }

    /// Launch every stage, wired stage to stage.
    ///
    /// A stage that fails to start is recorded and its endpoints closed; its
    /// neighbours see end-of-stream or a broken pipe and the rest of the
    /// pipeline runs on. If a channel cannot be opened nothing further is
    /// spawned: the stages already running are waited for and the channel
    /// error is returned.
    #[tracing::instrument(level = "debug", skip(self), fields(stage_count = self.stages.len()))]
    pub async fn spawn(&self) -> PipelineResult<RunningPipeline> {
        let last = self.stages.len() - 1;
        let capture = self.stdout == PipelineOutput::Capture;
        let mut running = RunningPipeline::new(Vec::with_capacity(self.stages.len()), capture);
        let mut upstream: Option<ReadEnd> = None;

        for (index, spec) in self.stages.iter().enumerate() {
            let stdin = match upstream.take() {
                Some(end) => StageInput::Channel(end),
                None => match self.stdin {
                    PipelineInput::Inherit => StageInput::Inherit,
                    PipelineInput::Null => StageInput::Null,
                },
            };

            let stdout = if index < last {
                let channel = match Channel::open(index) {
                    Ok(channel) => channel,
                    Err(err) => {
                        drop(stdin);
                        abandon(running).await;
                        return Err(err);
                    }
                };
                let (read, write) = channel.into_ends();
                upstream = Some(read);
                StageOutput::Channel(write)
            } else if capture {
                StageOutput::Capture
            } else {
                StageOutput::Inherit
            };

            let handle = match spawn_stage(index, spec, stdin, stdout) {
                Ok(mut child) => {
                    if index == last && capture {
                        running.set_capture(child.stdout.take());
                    }
                    StageHandle::Live(child)
                }
                Err(err) => {
                    tracing::warn!(
                        stage = index,
                        command = %spec,
                        error = %err,
                        "failed to spawn stage"
                    );
                    StageHandle::Failed(spawn_failure(&err))
                }
            };

            running.push(RunningStage {
                index,
                command: spec.to_string(),
                handle,
            });
        }

        Ok(running)
    }
}

/// Reap the stages launched before a build was abandoned.
///
/// Their endpoints are already closed, so each sees end-of-stream or a
/// broken pipe and exits.
async fn abandon(running: RunningPipeline) {
    match running.wait().await {
        Ok(report) => {
            for stage in &report.stages {
                tracing::warn!(
                    stage = stage.index,
                    command = %stage.command,
                    status = %stage.status,
                    "reaped stage of abandoned pipeline"
                );
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to reap abandoned pipeline");
        }
    }
}
