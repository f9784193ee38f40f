//! Noise filtering - drops dynamic, non-strategic lines.
//!
//! Every rule looks at a single line in isolation, so the filter is
//! stateless and idempotent.

use regex::Regex;
use std::sync::LazyLock;

/// Line patterns that mark noise (matched case-insensitively).
const NOISE_PATTERNS: &[&str] = &[
    // Relative timestamps and counters: "3 hours ago", "12 comments ago"
    r"\b\d+\s+(?:points?|comments?|hours?|minutes?|days?|seconds?|years?|months?)\s+ago\b",
    // Standalone counters
    r"^\d+\s+(?:points?|comments?)$",
    // Aggregator chrome
    r"^\s*\|\s*hide\s*\|\s*$",
    r"^\s*past\s*\|\s*comments\s*\|\s*ask\s*\|\s*show\s*\|\s*jobs\s*\|\s*submit\s*$",
    // Generic navigation labels
    r"^\s*(?:login|sign\s*up|search|menu|help|guidelines|faq|legal|security|terms|privacy|contact|apply\s*to\s*yc)\s*$",
    r"^\s*search\s*:",
    // Raw dates
    r"^\d{4}-\d{2}-\d{2}",
    // Copyright years
    r"©\s*\d{4}",
];

static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let combined = NOISE_PATTERNS
        .iter()
        .map(|p| format!("(?:{})", p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){}", combined)).unwrap()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Remove noise lines from extracted text.
///
/// Blank lines are dropped, surviving lines are trimmed and keep their order.
pub fn filter_noise(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_noise_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// True when a trimmed line is dynamic or navigational noise.
pub fn is_noise_line(line: &str) -> bool {
    NOISE_RE.is_match(line) || is_short_number(line)
}

/// Pagination and vote-count artifacts.
fn is_short_number(line: &str) -> bool {
    !line.is_empty() && line.len() < 5 && line.chars().all(|c| c.is_ascii_digit())
}

/// Collapse all whitespace runs into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}
