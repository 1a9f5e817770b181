//! pipeshell: run command lists, one line at a time.
//!
//! Usage:
//!   pipeshell
//!
//! Each line holds pipelines separated by `;` (wait for it) or `&` (keep it
//! running and start the next), e.g. `sleep 1 & ps aux | wc -l ; echo done`.
//! `exit`, `quit`, or end of input leaves the shell.

use std::process::ExitCode;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tokio::runtime::Runtime;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pipechain_kernel::{CommandList, ItemOutcome, ListRunner};

fn main() -> ExitCode {
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
    let runtime = Runtime::new().context("Failed to start runtime")?;
    let runner = ListRunner::new();

    let mut rl: Editor<(), DefaultHistory> =
        Editor::new().context("Failed to create editor")?;

    let mut line_number: u64 = 1;
    loop {
        let prompt = format!("shell[{line_number}]% ");

        match rl.readline(&prompt) {
            Ok(line) => {
                if CommandList::is_exit(&line) {
                    break;
                }
                if let Err(e) = rl.add_history_entry(line.as_str()) {
                    tracing::warn!("Failed to add history entry: {}", e);
                }

                match CommandList::parse(&line) {
                    Ok(list) => {
                        for outcome in runtime.block_on(runner.run(&list)) {
                            report(&outcome);
                        }
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
                line_number += 1;
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    println!("Exiting shell...");
    Ok(ExitCode::SUCCESS)
}

/// One line per item: did its command start.
fn report(outcome: &ItemOutcome) {
    if outcome.launched() {
        println!("Successfully executed command: {}", outcome.text);
        return;
    }

    match &outcome.result {
        Ok(report) => {
            for stage in report.failures().filter(|s| s.status.never_started()) {
                eprintln!("{}: {}", stage.program(), stage.status);
            }
        }
        Err(e) => eprintln!("{}", e),
    }
    eprintln!("Error: Failed to execute command: {}", outcome.text);
}
