//! Command-list execution.
//!
//! An item ended by `;` is waited for before the next item launches; an
//! item ended by `&` is left running while the rest of the line launches,
//! and is waited for once the line is done.

use pipechain_types::{CommandList, ItemMode, ListItem, PipelineReport};

use crate::error::PipelineResult;

use super::pipeline::{PipelineBuilder, PipelineInput, PipelineOutput};
use super::running::RunningPipeline;

/// What became of one list item.
#[derive(Debug)]
pub struct ItemOutcome {
    /// The item's text, as typed.
    pub text: String,
    /// Wait or run on.
    pub mode: ItemMode,
    /// The pipeline's report, or why it could not be built.
    pub result: PipelineResult<PipelineReport>,
}

impl ItemOutcome {
    /// True if every stage of the item started.
    pub fn launched(&self) -> bool {
        match &self.result {
            Ok(report) => report.stages.iter().all(|stage| !stage.status.never_started()),
            Err(_) => false,
        }
    }
}

/// Runs command lists, one pipeline per item.
#[derive(Debug, Clone, Copy)]
pub struct ListRunner {
    stdin: PipelineInput,
    stdout: PipelineOutput,
}

impl Default for ListRunner {
    /// Items read an empty stdin, so they never compete with whoever reads
    /// the lines, and write to the inherited stdout.
    fn default() -> Self {
        Self {
            stdin: PipelineInput::Null,
            stdout: PipelineOutput::Inherit,
        }
    }
}

enum Pending {
    Done(PipelineResult<PipelineReport>),
    Running(RunningPipeline),
}

impl ListRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set where each item's first stage reads from.
    pub fn stdin(mut self, input: PipelineInput) -> Self {
        self.stdin = input;
        self
    }

    /// Set where each item's last stage writes to.
    pub fn stdout(mut self, output: PipelineOutput) -> Self {
        self.stdout = output;
        self
    }

    /// Run every item of `list`. Outcomes come back in item order.
    #[tracing::instrument(level = "debug", skip(self, list), fields(items = list.items().len()))]
    pub async fn run(&self, list: &CommandList) -> Vec<ItemOutcome> {
        let mut pending = Vec::with_capacity(list.items().len());

        for item in list.items() {
            tracing::debug!(item = %item.text, mode = ?item.mode, "launching list item");
            let state = match self.launch(item).await {
                Ok(running) if item.mode == ItemMode::Background => Pending::Running(running),
                Ok(running) => Pending::Done(running.wait().await),
                Err(err) => Pending::Done(Err(err)),
            };
            pending.push((item, state));
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        for (item, state) in pending {
            let result = match state {
                Pending::Done(result) => result,
                Pending::Running(running) => running.wait().await,
            };
            outcomes.push(ItemOutcome {
                text: item.text.clone(),
                mode: item.mode,
                result,
            });
        }
        outcomes
    }

    async fn launch(&self, item: &ListItem) -> PipelineResult<RunningPipeline> {
        PipelineBuilder::new(item.stages.clone())?
            .stdin(self.stdin)
            .stdout(self.stdout)
            .spawn()
            .await
    }
}
