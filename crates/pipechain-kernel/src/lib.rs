//! pipechain-kernel: process pipelines wired by kernel pipes.
//!
//! This crate provides:
//!
//! - **Channels**: close-on-exec pipes whose endpoints are owned values
//! - **Scheduler**: single-stage spawning, the `PipelineBuilder`, and the
//!   `RunningPipeline` wait that collects every stage's status
//! - **Command lists**: `ListRunner` runs `;`-separated items in turn and
//!   `&`-terminated items side by side
//! - **Supervisor**: the process-count template (`ps aux | grep TERM | wc -l`)
//!   with its configuration

pub mod channel;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod supervisor;
pub mod template;

pub use channel::{Channel, ReadEnd, WriteEnd};
pub use config::SupervisorConfig;
pub use error::{PipelineError, PipelineResult};
pub use scheduler::{
    ItemOutcome, ListRunner, PipelineBuilder, PipelineInput, PipelineOutput, RunningPipeline,
};
pub use supervisor::Supervisor;
pub use template::ProcessCountTemplate;

// Data types, so embedders need only this crate
pub use pipechain_types::{
    CommandList, ExitPolicy, ItemMode, ListItem, PipelineReport, StageOutcome, StageSpec,
    StageStatus,
};
