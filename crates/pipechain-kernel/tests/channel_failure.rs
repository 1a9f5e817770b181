//! Running out of descriptors while opening a channel.
//!
//! Lowers `RLIMIT_NOFILE` for the whole process, so it lives in its own
//! test binary with a single test.

#![cfg(target_os = "linux")]

use std::os::fd::RawFd;

use nix::fcntl::{fcntl, FcntlArg};
use nix::sys::resource::{getrlimit, setrlimit, Resource};

use pipechain_kernel::{PipelineBuilder, PipelineError, PipelineInput, PipelineOutput};

/// Descriptors open right now, ignoring the one used to list them.
fn open_descriptors() -> Vec<RawFd> {
    let listed: Vec<RawFd> = std::fs::read_dir("/proc/self/fd")
        .expect("procfs is mounted")
        .filter_map(|entry| entry.ok()?.file_name().to_str()?.parse().ok())
        .collect();
    listed
        .into_iter()
        .filter(|fd| fcntl(*fd, FcntlArg::F_GETFD).is_ok())
        .collect()
}

/// Smallest descriptor limit that leaves exactly `free` numbers unused.
fn limit_leaving(open: &[RawFd], free: usize) -> u64 {
    (0..)
        .find(|limit: &RawFd| {
            let used = open.iter().filter(|fd| **fd < *limit).count();
            *limit as usize - used == free
        })
        .expect("a limit exists") as u64
}

fn chain() -> PipelineBuilder {
    // The listing ignores stdin, so inheriting it needs no descriptor.
    PipelineBuilder::parse("seq 1 1000 | cat | cat | cat | cat | wc -l")
        .unwrap()
        .stdin(PipelineInput::Inherit)
        .stdout(PipelineOutput::Capture)
}

#[tokio::test]
async fn channel_failure_stops_the_build_and_reaps_started_stages() {
    // The first spawn sets up the runtime's child-reaping machinery.
    let warm = chain().run().await.unwrap();
    assert_eq!(warm.captured_trimmed(), Some("1000"));

    let before = open_descriptors();
    let (soft, hard) = getrlimit(Resource::RLIMIT_NOFILE).unwrap();

    // Two free numbers: channel 0 takes both, stage 0 gives one back when
    // its write end is closed, and channel 1 cannot be opened.
    setrlimit(Resource::RLIMIT_NOFILE, limit_leaving(&before, 2), hard).unwrap();
    let result = chain().spawn().await;
    setrlimit(Resource::RLIMIT_NOFILE, soft, hard).unwrap();

    match result {
        Err(PipelineError::Channel { index, source }) => {
            assert_eq!(index, 1);
            assert_eq!(source, nix::errno::Errno::EMFILE);
        }
        Err(other) => panic!("expected a channel error, got {other}"),
        Ok(running) => panic!("expected a channel error, {} stages started", running.len()),
    }

    assert_eq!(open_descriptors(), before, "descriptors left open after the failed build");

    // Nothing is left in a bad state for the next run.
    let report = chain().run().await.unwrap();
    assert_eq!(report.captured_trimmed(), Some("1000"));
}
