//! Pure data types for pipechain: stage specs, command lists, statuses, reports.
//!
//! This crate is a leaf dependency with no async runtime and no I/O, so
//! consumers can describe pipelines and read their results without pulling
//! in the process-spawning machinery of pipechain-kernel.

pub mod list;
pub mod report;
pub mod stage;
pub mod status;

// Flat re-exports for convenience
pub use list::*;
pub use report::*;
pub use stage::*;
pub use status::*;
