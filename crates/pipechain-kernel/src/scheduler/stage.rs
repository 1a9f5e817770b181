//! Launching a single stage.
//!
//! This is the one step the pipeline builder repeats per stage: install the
//! given endpoints as the child's stdin/stdout and start the command.

use std::io;
use std::process::{ExitStatus, Stdio};

use nix::sys::signal::Signal;
use tokio::process::{Child, Command};

use pipechain_types::{StageSpec, StageStatus, CODE_CANNOT_EXECUTE, CODE_NOT_FOUND};

use crate::channel::{ReadEnd, WriteEnd};

/// Where a stage reads from.
#[derive(Debug)]
pub enum StageInput {
    /// The supervisor's own stdin.
    Inherit,
    /// An empty stream.
    Null,
    /// The read end of the upstream channel.
    Channel(ReadEnd),
}

/// Where a stage writes to.
#[derive(Debug)]
pub enum StageOutput {
    /// The supervisor's own stdout.
    Inherit,
    /// A pipe back to the supervisor.
    Capture,
    /// The write end of the downstream channel.
    Channel(WriteEnd),
}

impl From<StageInput> for Stdio {
    fn from(input: StageInput) -> Self {
        match input {
            StageInput::Inherit => Stdio::inherit(),
            StageInput::Null => Stdio::null(),
            StageInput::Channel(end) => end.into(),
        }
    }
}

impl From<StageOutput> for Stdio {
    fn from(output: StageOutput) -> Self {
        match output {
            StageOutput::Inherit => Stdio::inherit(),
            StageOutput::Capture => Stdio::piped(),
            StageOutput::Channel(end) => end.into(),
        }
    }
}

/// Spawn one stage with exactly the endpoints it owns.
///
/// The endpoints are consumed. Whether or not the spawn succeeds, the
/// supervisor's copies are closed before this returns: the `Command` that
/// holds them is dropped here. stderr is always inherited so a failing
/// command's diagnostic reaches the terminal directly.
pub fn spawn_stage(
    index: usize,
    spec: &StageSpec,
    stdin: StageInput,
    stdout: StageOutput,
) -> io::Result<Child> {
    let mut cmd = Command::new(spec.program());
    cmd.args(spec.args())
        .stdin(stdin)
        .stdout(stdout)
        .stderr(Stdio::inherit());

    let child = cmd.spawn()?;
    tracing::debug!(stage = index, command = %spec, pid = ?child.id(), "spawned stage");
    Ok(child)
}

/// Status for a stage whose command never started.
pub fn spawn_failure(err: &io::Error) -> StageStatus {
    let code = match err.kind() {
        io::ErrorKind::NotFound => CODE_NOT_FOUND,
        _ => CODE_CANNOT_EXECUTE,
    };
    StageStatus::SpawnFailed {
        code,
        reason: err.to_string(),
    }
}

/// Status for a stage whose command ran to completion.
pub fn exit_status(status: ExitStatus) -> StageStatus {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => StageStatus::Exited(code),
        (None, Some(signal)) => StageStatus::Signaled(signal),
        // Stopped/continued never reach a final wait.
        (None, None) => StageStatus::Exited(-1),
    }
}

/// Human-readable signal name, e.g. `SIGPIPE`.
pub fn signal_name(signal: i32) -> String {
    Signal::try_from(signal)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|_| format!("signal {}", signal))
}
