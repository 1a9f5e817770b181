//! Stage descriptors: one external command per pipeline stage.

use std::ffi::OsString;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One stage of a pipeline: an external program and its argument list.
///
/// Immutable once built. The program is resolved through `PATH` when it is a
/// bare name; arguments are handed to it verbatim, with no shell involved.
/// Arguments are OS strings, so bytes that are not UTF-8 survive intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    program: String,
    args: Vec<OsString>,
}

impl StageSpec {
    /// Create a stage running `program` with `args`.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a stage running `program` with no arguments.
    pub fn bare(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Executable name or path.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments, excluding the program name.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Parse `a x | b y | c` into one spec per `|`-separated segment.
    ///
    /// Words are split on whitespace. There is no quoting: this is for
    /// describing fixed pipelines compactly, not a shell grammar.
    pub fn parse_pipeline(text: &str) -> Result<Vec<StageSpec>, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::EmptyPipeline);
        }

        text.split('|')
            .enumerate()
            .map(|(index, segment)| {
                let mut words = segment.split_whitespace();
                let program = words.next().ok_or(ParseError::EmptyStage { index })?;
                Ok(StageSpec::new(program, words))
            })
            .collect()
    }
}

impl std::fmt::Display for StageSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Errors from [`StageSpec::parse_pipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty pipeline")]
    EmptyPipeline,
    #[error("stage {index} has no command")]
    EmptyStage { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_three_stages() {
        let stages = StageSpec::parse_pipeline("ps aux | grep sshd | wc -l").unwrap();
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0], StageSpec::new("ps", ["aux"]));
        assert_eq!(stages[1], StageSpec::new("grep", ["sshd"]));
        assert_eq!(stages[2], StageSpec::new("wc", ["-l"]));
    }

    #[test]
    fn parse_single_bare_stage() {
        let stages = StageSpec::parse_pipeline("  uptime  ").unwrap();
        assert_eq!(stages, vec![StageSpec::bare("uptime")]);
        assert!(stages[0].args().is_empty());
    }

    #[test]
    fn parse_rejects_empty_text() {
        assert_eq!(StageSpec::parse_pipeline("   "), Err(ParseError::EmptyPipeline));
    }

    #[test]
    fn parse_rejects_empty_segment() {
        assert_eq!(
            StageSpec::parse_pipeline("cat file | | wc"),
            Err(ParseError::EmptyStage { index: 1 })
        );
        assert_eq!(
            StageSpec::parse_pipeline("cat file |"),
            Err(ParseError::EmptyStage { index: 1 })
        );
    }

    #[test]
    fn display_joins_program_and_args() {
        let spec = StageSpec::new("grep", ["-v", "needle"]);
        assert_eq!(spec.to_string(), "grep -v needle");
        assert_eq!(StageSpec::bare("ps").to_string(), "ps");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_args_are_kept_verbatim() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let term = OsStr::from_bytes(b"caf\xe9");
        let spec = StageSpec::new("grep", [term]);
        assert_eq!(spec.args()[0].as_bytes(), b"caf\xe9");
        assert_eq!(spec.to_string(), "grep caf\u{fffd}");
    }
}
