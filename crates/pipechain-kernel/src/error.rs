//! Errors raised while building or supervising a pipeline.
//!
//! A stage whose command fails to start or exits non-zero is not an error
//! here: that is recorded in the [`PipelineReport`](pipechain_types::PipelineReport).
//! These are the failures that stop the supervisor itself.

use nix::errno::Errno;
use thiserror::Error;

use pipechain_types::ParseError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline construction and supervision errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline has no stages")]
    EmptyPipeline,

    #[error("invalid pipeline: {0}")]
    Parse(#[from] ParseError),

    #[error("pipe error: channel {index}: {source}")]
    Channel {
        index: usize,
        #[source]
        source: Errno,
    },

    #[error("wait error: stage {index} ({command}): {source}")]
    Wait {
        index: usize,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read pipeline output: {0}")]
    Capture(#[source] std::io::Error),
}
