//! processes: count the process-table lines that mention a term.
//!
//! Usage:
//!   processes <term>            # ps aux | grep <term> | wc -l
//!
//! Prints the count, then `commands completed` once every stage has exited.

use std::env;
use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pipechain_kernel::{PipelineReport, Supervisor, SupervisorConfig};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var). stdout is reserved for
    // the pipeline's own output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    // OS strings: the term reaches the filter byte for byte, UTF-8 or not.
    let args: Vec<OsString> = env::args_os().collect();

    // Exactly one term; a multi-word term must arrive as one quoted argument.
    let term = match args.as_slice() {
        [_, term] => term,
        _ => {
            eprintln!("Usage: processes <term>");
            return Ok(ExitCode::FAILURE);
        }
    };

    let supervisor = Supervisor::new(SupervisorConfig::default());

    let rt = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    let report = rt
        .block_on(supervisor.run(term))
        .context("Failed to run pipeline")?;

    report_failures(&report);
    println!("commands completed");

    let code = supervisor.exit_code(&report);
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

/// Print a diagnostic for each stage whose command never started.
///
/// Stages that ran and failed have already written their own diagnostics
/// to the inherited stderr.
fn report_failures(report: &PipelineReport) {
    for stage in report.failures() {
        if stage.status.never_started() {
            eprintln!("{}: {}", stage.program(), stage.status);
        }
    }
}
