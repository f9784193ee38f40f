//! Change set types produced by the structural differ.

use serde::{Deserialize, Serialize};

/// Net paragraph changes between two observations of a page.
///
/// `lines_added_count` / `lines_removed_count` count the paragraphs joined
/// into `added` / `removed`, except for the first observation where the
/// whole new text is `added` and the count is its line count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Added paragraphs, separated by blank lines
    pub added: String,

    /// Removed paragraphs, separated by blank lines
    pub removed: String,

    /// Number of added paragraphs (or lines, on first observation)
    pub lines_added_count: usize,

    /// Number of removed paragraphs
    pub lines_removed_count: usize,
}

impl ChangeSet {
    /// The change set for a page seen for the first time.
    pub fn first_observation(new_text: &str) -> Self {
        Self {
            added: new_text.to_string(),
            removed: String::new(),
            lines_added_count: new_text.lines().count(),
            lines_removed_count: 0,
        }
    }

    /// Build a change set from surviving added/removed paragraphs.
    pub fn from_paragraphs(added: &[&str], removed: &[&str]) -> Self {
        Self {
            added: added.join("\n\n"),
            removed: removed.join("\n\n"),
            lines_added_count: added.len(),
            lines_removed_count: removed.len(),
        }
    }

    /// True when nothing was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Alignment tag for a single paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffTag {
    /// Present in both old and new text
    Unchanged,
    /// Present only in the new text
    Added,
    /// Present only in the old text
    Removed,
}

/// One aligned paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParagraphOp<'a> {
    pub tag: DiffTag,
    pub text: &'a str,
}

impl<'a> ParagraphOp<'a> {
    pub fn new(tag: DiffTag, text: &'a str) -> Self {
        Self { tag, text }
    }
}
