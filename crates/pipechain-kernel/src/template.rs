//! The process-count pipeline: list processes, filter by a term, count lines.

use std::ffi::OsStr;

use pipechain_types::StageSpec;

/// Three-stage template behind the `processes` command.
///
/// Defaults to `ps aux | grep TERM | wc -l`. Each part can be replaced,
/// which is how tests run the same shape over a fixed listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCountTemplate {
    /// Produces the listing.
    pub list: StageSpec,
    /// Filter program; the term is appended as its last argument.
    pub filter: StageSpec,
    /// Counts what the filter lets through.
    pub count: StageSpec,
}

impl Default for ProcessCountTemplate {
    fn default() -> Self {
        Self {
            list: StageSpec::new("ps", ["aux"]),
            filter: StageSpec::bare("grep"),
            count: StageSpec::new("wc", ["-l"]),
        }
    }
}

impl ProcessCountTemplate {
    /// Replace the listing stage.
    pub fn with_list(mut self, list: StageSpec) -> Self {
        self.list = list;
        self
    }

    /// Replace the filter program (the term is still appended).
    pub fn with_filter(mut self, filter: StageSpec) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the counting stage.
    pub fn with_count(mut self, count: StageSpec) -> Self {
        self.count = count;
        self
    }

    /// The three stages for `term`. The term is passed verbatim.
    pub fn stages(&self, term: &OsStr) -> Vec<StageSpec> {
        let filter_args = self
            .filter
            .args()
            .iter()
            .map(|arg| arg.as_os_str())
            .chain(std::iter::once(term));

        vec![
            self.list.clone(),
            StageSpec::new(self.filter.program(), filter_args),
            self.count.clone(),
        ]
    }
}
