//! Command lists: pipelines separated by `;` (wait) or `&` (run on).

use serde::{Deserialize, Serialize};

use crate::stage::{ParseError, StageSpec};

/// What the interpreter does after launching a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemMode {
    /// Terminated by `;` or end of line: wait for it before the next item.
    Wait,
    /// Terminated by `&`: launch the next item while this one runs.
    Background,
}

/// One pipeline in a command list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// The item's source text, trimmed.
    pub text: String,
    /// Its stages.
    pub stages: Vec<StageSpec>,
    /// Wait or run on.
    pub mode: ItemMode,
}

/// A line of pipelines, e.g. `a & b | c ; d`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandList {
    items: Vec<ListItem>,
}

impl CommandList {
    /// Parse a line into items. Blank items (`a ;; b`, a trailing `;`) are
    /// skipped; a blank stage inside a pipeline is an error.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut items = Vec::new();
        let mut rest = line;

        while !rest.is_empty() {
            let (segment, mode, next) = match rest.find([';', '&']) {
                Some(at) => {
                    let mode = if rest[at..].starts_with('&') {
                        ItemMode::Background
                    } else {
                        ItemMode::Wait
                    };
                    (&rest[..at], mode, &rest[at + 1..])
                }
                None => (rest, ItemMode::Wait, ""),
            };

            let text = segment.trim();
            if !text.is_empty() {
                items.push(ListItem {
                    text: text.to_string(),
                    stages: StageSpec::parse_pipeline(text)?,
                    mode,
                });
            }
            rest = next;
        }

        Ok(Self { items })
    }

    /// True for a line that asks the interpreter to stop.
    pub fn is_exit(line: &str) -> bool {
        let line = line.trim();
        line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
    }

    /// The items, in order.
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    /// True if the line held no commands.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
