//! Channels: kernel pipes with explicitly owned endpoints.
//!
//! Both endpoints are created close-on-exec. A spawned command therefore
//! only ever sees the endpoint that was installed as its stdin or stdout;
//! every other endpoint is closed at exec time in the child, and closed in
//! the supervisor when its owning value is dropped. A reader sees
//! end-of-stream only once every write endpoint is gone, so nothing here is
//! `Clone`.

use std::fs::File;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::process::Stdio;

use crate::error::{PipelineError, PipelineResult};

/// Read end of a channel.
#[derive(Debug)]
pub struct ReadEnd(OwnedFd);

/// Write end of a channel.
#[derive(Debug)]
pub struct WriteEnd(OwnedFd);

/// A unidirectional channel connecting stage `index` to stage `index + 1`.
#[derive(Debug)]
pub struct Channel {
    index: usize,
    read: ReadEnd,
    write: WriteEnd,
}

impl Channel {
    /// Open the channel that will carry stage `index`'s output.
    pub fn open(index: usize) -> PipelineResult<Self> {
        let (read, write) =
            open_pipe().map_err(|source| PipelineError::Channel { index, source })?;

        tracing::debug!(
            index,
            read_fd = read.as_raw_fd(),
            write_fd = write.as_raw_fd(),
            "opened channel"
        );

        Ok(Self {
            index,
            read: ReadEnd(read),
            write: WriteEnd(write),
        })
    }

    /// Position of the upstream stage.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Split into endpoints so each can be handed to its own stage.
    pub fn into_ends(self) -> (ReadEnd, WriteEnd) {
        (self.read, self.write)
    }
}

impl AsFd for ReadEnd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.0.as_fd()
    }
}

impl AsFd for WriteEnd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.0.as_fd()
    }
}

impl From<ReadEnd> for Stdio {
    fn from(end: ReadEnd) -> Self {
        Stdio::from(end.0)
    }
}

impl From<WriteEnd> for Stdio {
    fn from(end: WriteEnd) -> Self {
        Stdio::from(end.0)
    }
}

impl From<ReadEnd> for File {
    fn from(end: ReadEnd) -> Self {
        File::from(end.0)
    }
}

impl From<WriteEnd> for File {
    fn from(end: WriteEnd) -> Self {
        File::from(end.0)
    }
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly",
))]
fn open_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    nix::unistd::pipe2(nix::fcntl::OFlag::O_CLOEXEC)
}

// No pipe2: a concurrent spawn can still inherit these between the two calls.
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly",
)))]
fn open_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    use nix::fcntl::{fcntl, FcntlArg, FdFlag};

    let (read, write) = nix::unistd::pipe()?;
    for fd in [&read, &write] {
        fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    }
    Ok((read, write))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::fcntl::{fcntl, FcntlArg, FdFlag};
    use std::io::{Read, Write};

    fn is_cloexec(fd: &impl AsFd) -> bool {
        let flags = fcntl(fd.as_fd().as_raw_fd(), FcntlArg::F_GETFD).unwrap();
        FdFlag::from_bits_truncate(flags).contains(FdFlag::FD_CLOEXEC)
    }

    #[test]
    fn endpoints_are_close_on_exec() {
        let (read, write) = Channel::open(0).unwrap().into_ends();
        assert!(is_cloexec(&read));
        assert!(is_cloexec(&write));
    }

    #[test]
    fn bytes_flow_in_order() {
        let channel = Channel::open(3).unwrap();
        assert_eq!(channel.index(), 3);

        let (read, write) = channel.into_ends();
        let mut writer = File::from(write);
        writer.write_all(b"first\nsecond\n").unwrap();
        drop(writer);

        let mut out = String::new();
        File::from(read).read_to_string(&mut out).unwrap();
        assert_eq!(out, "first\nsecond\n");
    }

    #[test]
    fn dropping_write_end_signals_end_of_stream() {
        let (read, write) = Channel::open(0).unwrap().into_ends();
        drop(write);

        let mut buf = [0u8; 16];
        let n = File::from(read).read(&mut buf).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn writing_without_reader_is_broken_pipe() {
        let (read, write) = Channel::open(0).unwrap().into_ends();
        drop(read);

        // Rust ignores SIGPIPE, so the write reports EPIPE instead.
        let err = File::from(write).write_all(b"lost").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }
}
