//! Scheduler module for pipechain — launching and supervising pipelines.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Supervisor                            │
//! │                                                              │
//! │  ┌─────────┐ channel 0 ┌─────────┐ channel 1 ┌─────────┐     │
//! │  │ stage 0 │──────────▶│ stage 1 │──────────▶│ stage 2 │     │
//! │  │ (child) │  stdout   │ (child) │  stdout   │ (child) │     │
//! │  └─────────┘           └─────────┘           └─────────┘     │
//! │       ▲                     ▲                     ▲          │
//! │       └──────── wait ───────┴──────── wait ───────┘          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All stages are direct children of the supervisor. The supervisor waits
//! on every one of them and folds their statuses into a `PipelineReport`.
//! A `ListRunner` drives several such pipelines from one command line.

mod list;
mod pipeline;
mod running;
mod stage;

pub use list::{ItemOutcome, ListRunner};
pub use pipeline::{PipelineBuilder, PipelineInput, PipelineOutput};
pub use running::RunningPipeline;
pub use stage::{exit_status, signal_name, spawn_failure, spawn_stage, StageInput, StageOutput};
