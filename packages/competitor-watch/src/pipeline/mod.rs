//! Change-detection pipeline stages.
//!
//! Data flows strictly forward:
//!
//! ```text
//! HTML -> extract -> noise -> diff -> classify -> Snapshot
//! ```
//!
//! Extraction, noise filtering and diffing are pure functions. The
//! classifier and the [`monitor::Monitor`] that drives a full check are
//! async and talk to collaborators through traits.

pub mod classify;
pub mod diff;
pub mod extract;
pub mod monitor;
pub mod noise;
pub mod prompts;

pub use classify::{parse_summary, ChangeClassifier};
pub use diff::{align_paragraphs, generate_diff, generate_diff_with_threshold, split_paragraphs};
pub use extract::extract_main_text;
pub use monitor::{CheckOutcome, Monitor, SystemStatus};
pub use noise::{filter_noise, is_noise_line, normalize_whitespace};

/// Truncate to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
