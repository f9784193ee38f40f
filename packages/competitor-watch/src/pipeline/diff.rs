//! Structural diff - paragraph-level comparison of two filtered texts.
//!
//! Paragraphs are aligned with a longest-common-subsequence table, then
//! short changes are suppressed by the significance filter.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::types::change_set::{ChangeSet, DiffTag, ParagraphOp};
use crate::types::config::DEFAULT_SIGNIFICANCE_THRESHOLD;

static BLANK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Diff two filtered texts with the default significance threshold.
///
/// Changed paragraphs shorter than the threshold are dropped, unless they
/// are the other side of a replacement whose counterpart is significant.
pub fn generate_diff(old_text: &str, new_text: &str) -> ChangeSet {
    generate_diff_with_threshold(old_text, new_text, DEFAULT_SIGNIFICANCE_THRESHOLD)
}

/// Diff two filtered texts.
///
/// An empty `old_text` means the page has never been observed: the whole
/// new text is reported as added. A short paragraph replaced by (or
/// replacing) a significant one is kept alongside it.
pub fn generate_diff_with_threshold(old_text: &str, new_text: &str, threshold: usize) -> ChangeSet {
    if old_text.is_empty() {
        return ChangeSet::first_observation(new_text);
    }

    let old = split_paragraphs(old_text);
    let new = split_paragraphs(new_text);
    let ops = align_paragraphs(&old, &new);
    let kept = significant_changes(&ops, threshold);

    let added: Vec<&str> = kept
        .iter()
        .filter(|op| op.tag == DiffTag::Added)
        .map(|op| op.text)
        .collect();
    let removed: Vec<&str> = kept
        .iter()
        .filter(|op| op.tag == DiffTag::Removed)
        .map(|op| op.text)
        .collect();

    ChangeSet::from_paragraphs(&added, &removed)
}

/// Split text into trimmed, non-empty paragraphs on blank lines.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    BLANK_LINE_RE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Align two paragraph sequences.
///
/// Within a change hunk removals come before additions. A paragraph that
/// was only moved (removed in one place, added verbatim in another) is
/// tagged `Unchanged` at both positions.
pub fn align_paragraphs<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<ParagraphOp<'a>> {
    let (n, m) = (old.len(), new.len());

    // lcs[i][j] = LCS length of old[i..] and new[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(ParagraphOp::new(DiffTag::Unchanged, new[j]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            ops.push(ParagraphOp::new(DiffTag::Removed, old[i]));
            i += 1;
        } else {
            ops.push(ParagraphOp::new(DiffTag::Added, new[j]));
            j += 1;
        }
    }
    ops.extend(old[i..].iter().map(|&p| ParagraphOp::new(DiffTag::Removed, p)));
    ops.extend(new[j..].iter().map(|&p| ParagraphOp::new(DiffTag::Added, p)));

    cancel_moves(&mut ops);
    ops
}

/// Re-tag removed/added pairs with identical text as unchanged.
fn cancel_moves(ops: &mut [ParagraphOp<'_>]) {
    let mut matched = HashSet::new();

    for a in 0..ops.len() {
        if ops[a].tag != DiffTag::Added {
            continue;
        }
        let partner = (0..ops.len()).find(|&r| {
            ops[r].tag == DiffTag::Removed && ops[r].text == ops[a].text && !matched.contains(&r)
        });
        if let Some(r) = partner {
            matched.insert(r);
            ops[a].tag = DiffTag::Unchanged;
            ops[r].tag = DiffTag::Unchanged;
        }
    }
}

/// Apply the significance filter to aligned paragraphs.
///
/// A changed paragraph shorter than `threshold` chars is dropped unless it
/// is paired (k-th removal with k-th addition of the same hunk) with a
/// paragraph that meets the threshold.
pub fn significant_changes<'a>(ops: &[ParagraphOp<'a>], threshold: usize) -> Vec<ParagraphOp<'a>> {
    let is_significant = |text: &str| text.chars().count() >= threshold;
    let mut kept = Vec::new();

    for hunk in ops.split(|op| op.tag == DiffTag::Unchanged) {
        let removed: Vec<&str> = hunk
            .iter()
            .filter(|op| op.tag == DiffTag::Removed)
            .map(|op| op.text)
            .collect();
        let added: Vec<&str> = hunk
            .iter()
            .filter(|op| op.tag == DiffTag::Added)
            .map(|op| op.text)
            .collect();

        let survives = |own: &str, partner: Option<&&str>| {
            is_significant(own) || partner.is_some_and(|p| is_significant(*p))
        };

        for (k, &text) in removed.iter().enumerate() {
            if survives(text, added.get(k)) {
                kept.push(ParagraphOp::new(DiffTag::Removed, text));
            }
        }
        for (k, &text) in added.iter().enumerate() {
            if survives(text, removed.get(k)) {
                kept.push(ParagraphOp::new(DiffTag::Added, text));
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LONG_A: &str = "Our platform now supports single sign-on for every plan.";
    const LONG_B: &str = "Enterprise customers get a dedicated success manager.";
    const LONG_C: &str = "We launched an API for programmatic report exports.";

    #[test]
    fn test_first_observation() {
        let new = "Hello world this is new content exceeding thirty chars";
        let cs = generate_diff("", new);

        assert_eq!(cs.added, new);
        assert_eq!(cs.removed, "");
        assert_eq!(cs.lines_added_count, 1);
        assert_eq!(cs.lines_removed_count, 0);
    }

    #[test]
    fn test_first_observation_keeps_short_text_verbatim() {
        let cs = generate_diff("", "short\nlines");
        assert_eq!(cs.added, "short\nlines");
        assert_eq!(cs.lines_added_count, 2);
    }

    #[test]
    fn test_identical_texts_have_no_changes() {
        let text = format!("{LONG_A}\n\n{LONG_B}\n\n{LONG_C}");
        let cs = generate_diff(&text, &text);
        assert!(cs.is_empty());
        assert_eq!(cs.lines_added_count, 0);
        assert_eq!(cs.lines_removed_count, 0);
    }

    #[test]
    fn test_added_and_removed_paragraphs() {
        let old = format!("{LONG_A}\n\n{LONG_B}");
        let new = format!("{LONG_A}\n\n{LONG_C}");
        let cs = generate_diff(&old, &new);

        assert_eq!(cs.added, LONG_C);
        assert_eq!(cs.removed, LONG_B);
        assert_eq!(cs.lines_added_count, 1);
        assert_eq!(cs.lines_removed_count, 1);
    }

    #[test]
    fn test_short_changes_are_dropped() {
        let old = format!("{LONG_A}\n\nPrice: $10");
        let new = format!("{LONG_A}\n\nPrice: $12\n\nBeta");
        let cs = generate_diff(&old, &new);

        assert!(cs.is_empty());
        assert_eq!(cs.lines_added_count, 0);
        assert_eq!(cs.lines_removed_count, 0);
    }

    #[test]
    fn test_short_side_of_significant_edit_is_kept() {
        let old = "We charge $10/month.\n\nContact us for support.";
        let new = "We charge $15/month for Pro plans.\n\nContact us for support.\n\n\
                   New feature: dark mode now available across all dashboards.";
        let cs = generate_diff(old, new);

        assert_eq!(
            cs.added,
            "We charge $15/month for Pro plans.\n\n\
             New feature: dark mode now available across all dashboards."
        );
        assert_eq!(cs.removed, "We charge $10/month.");
        assert_eq!(cs.lines_added_count, 2);
        assert_eq!(cs.lines_removed_count, 1);
    }

    #[test]
    fn test_short_paragraph_replaced_by_long_one_is_kept() {
        let old = format!("{LONG_A}\n\nPrice: $10");
        let new = format!("{LONG_A}\n\n{LONG_B}");
        let cs = generate_diff(&old, &new);

        assert_eq!(cs.added, LONG_B);
        assert_eq!(cs.removed, "Price: $10");
        assert_eq!(cs.lines_removed_count, 1);
    }

    #[test]
    fn test_reordering_is_not_a_change() {
        let old = format!("{LONG_A}\n\n{LONG_B}\n\n{LONG_C}");
        let new = format!("{LONG_C}\n\n{LONG_A}\n\n{LONG_B}");
        assert!(generate_diff(&old, &new).is_empty());
    }

    #[test]
    fn test_duplicated_paragraph_is_an_addition() {
        let cs = generate_diff(LONG_A, &format!("{LONG_A}\n\n{LONG_A}"));
        assert_eq!(cs.added, LONG_A);
        assert_eq!(cs.lines_added_count, 1);
    }

    #[test]
    fn test_custom_threshold() {
        let cs = generate_diff_with_threshold("Old words here", "New words here", 5);
        assert_eq!(cs.added, "New words here");
        assert_eq!(cs.removed, "Old words here");
    }

    #[test]
    fn test_split_paragraphs() {
        let text = "  first line\nsecond line \n\n\n third \n   \nfourth\n\n";
        assert_eq!(
            split_paragraphs(text),
            vec!["first line\nsecond line", "third", "fourth"]
        );
    }

    #[test]
    fn test_align_tags() {
        let ops = align_paragraphs(&["a", "b", "c"], &["a", "x", "c", "d"]);
        let tags: Vec<_> = ops.iter().map(|op| (op.tag, op.text)).collect();
        assert_eq!(
            tags,
            vec![
                (DiffTag::Unchanged, "a"),
                (DiffTag::Removed, "b"),
                (DiffTag::Added, "x"),
                (DiffTag::Unchanged, "c"),
                (DiffTag::Added, "d"),
            ]
        );
    }

    fn paragraphs() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop::sample::select(vec![LONG_A, LONG_B, LONG_C, "tiny", "Price: $10"]),
            0..8,
        )
        .prop_map(|ps| ps.join("\n\n"))
    }

    fn short_paragraphs() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop::sample::select(vec!["tiny", "Price: $10", "Price: $12", "Beta", "v2"]),
            0..6,
        )
        .prop_map(|ps| ps.join("\n\n"))
    }

    proptest! {
        #[test]
        fn prop_diff_is_deterministic(old in paragraphs(), new in paragraphs()) {
            prop_assert_eq!(generate_diff(&old, &new), generate_diff(&old, &new));
        }

        #[test]
        fn prop_self_diff_is_empty(text in paragraphs()) {
            prop_assume!(!text.is_empty());
            prop_assert!(generate_diff(&text, &text).is_empty());
        }

        #[test]
        fn prop_short_only_hunks_never_surface(
            old in short_paragraphs(),
            new in short_paragraphs(),
        ) {
            let old = format!("{LONG_A}\n\n{old}");
            let new = format!("{LONG_A}\n\n{new}");
            let cs = generate_diff(&old, &new);
            prop_assert!(cs.is_empty());
        }
    }
}
