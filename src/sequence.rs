//! Ordered-list numbering that continues from a destination's content.
//!
//! The next number is always derived from what the destination currently
//! contains, never from a stored counter, so manual edits between pastes
//! are picked up.

use regex::Regex;
use std::sync::OnceLock;

fn ordered_item() -> &'static Regex {
    static ORDERED_ITEM: OnceLock<Regex> = OnceLock::new();
    ORDERED_ITEM.get_or_init(|| Regex::new(r"^\s*(\d+)\.\s+").expect("valid ordered item regex"))
}

/// Returns the index the next ordered-list item should use.
///
/// Scans `existing` line by line for items like `3. text` (leading
/// indentation allowed) and returns the largest number found plus one, or
/// `1` when there is none. Gaps and ordering are ignored; only the maximum
/// matters. Numbers too large to represent are skipped.
pub fn next_ordered_index(existing: &str) -> usize {
    let max = existing
        .lines()
        .filter_map(|line| ordered_item().captures(line))
        .filter_map(|caps| caps[1].parse::<usize>().ok())
        .max();

    match max {
        Some(max) => max.saturating_add(1),
        None => 1,
    }
}
