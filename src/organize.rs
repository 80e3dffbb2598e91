//! Tidying of a note's lines: trim, de-duplicate and sort.

use crate::markup::normalize_line_endings;
use chrono::NaiveDate;
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Ordering applied to the non-blank lines of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// Case-insensitive text order
    #[default]
    #[value(alias = "alpha")]
    Alphabetical,
    /// Shortest lines first
    Length,
    /// Oldest date mentioned in the line first
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizeRules {
    pub sort_by: SortBy,
    pub remove_duplicates: bool,
    pub trim_whitespace: bool,
}

impl Default for OrganizeRules {
    fn default() -> Self {
        OrganizeRules {
            sort_by: SortBy::Alphabetical,
            remove_duplicates: true,
            trim_whitespace: true,
        }
    }
}

/// Rewrites `content` according to `rules`.
///
/// Blank lines are never sorted: they keep their relative order and are
/// moved after the sorted text lines.
pub fn organize(content: &str, rules: &OrganizeRules) -> String {
    let normalized = normalize_line_endings(content);
    let mut lines: Vec<&str> = normalized.split('\n').collect();
    let original_count = lines.len();

    if rules.trim_whitespace {
        lines = lines.into_iter().map(str::trim).collect();
    }

    if rules.remove_duplicates {
        let mut seen = HashSet::new();
        lines.retain(|line| seen.insert(*line));
    }

    let (mut text_lines, blank_lines): (Vec<&str>, Vec<&str>) =
        lines.into_iter().partition(|line| !line.trim().is_empty());

    match rules.sort_by {
        SortBy::Alphabetical => text_lines.sort_by(|a, b| text_cmp(a, b)),
        SortBy::Length => text_lines.sort_by_key(|line| line.chars().count()),
        SortBy::Date => text_lines = sort_by_date(text_lines),
    }

    log::debug!(
        "organized {} lines into {} text and {} blank lines by {:?}",
        original_count,
        text_lines.len(),
        blank_lines.len(),
        rules.sort_by
    );

    text_lines
        .into_iter()
        .chain(blank_lines)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Case-insensitive comparison with the exact text as tiebreak.
pub fn text_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// A line with its date and case-folded text worked out once up front.
struct DateKey<'a> {
    date: Option<NaiveDate>,
    folded: String,
    line: &'a str,
}

/// Orders by date when both lines carry one, by text otherwise.
///
/// Not a total order once dated and undated lines are mixed, which is why
/// date sorting goes through [`merge_sort_by`].
fn date_cmp(a: &DateKey, b: &DateKey) -> Ordering {
    match (a.date, b.date) {
        (Some(left), Some(right)) => left.cmp(&right),
        _ => a.folded.cmp(&b.folded).then_with(|| a.line.cmp(b.line)),
    }
}

fn sort_by_date(lines: Vec<&str>) -> Vec<&str> {
    let keys = lines
        .into_iter()
        .map(|line| DateKey {
            date: extract_date(line),
            folded: line.to_lowercase(),
            line,
        })
        .collect();
    merge_sort_by(keys, &mut date_cmp)
        .into_iter()
        .map(|key| key.line)
        .collect()
}

struct DatePattern {
    regex: Regex,
    format: &'static str,
}

fn date_patterns() -> &'static [DatePattern] {
    static PATTERNS: OnceLock<Vec<DatePattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"\d{4}-\d{2}-\d{2}", "%Y-%m-%d"),
            (r"\d{2}/\d{2}/\d{4}", "%m/%d/%Y"),
            (r"\d{2}-\d{2}-\d{4}", "%m-%d-%Y"),
            (r"\d{4}/\d{2}/\d{2}", "%Y/%m/%d"),
        ]
        .into_iter()
        .map(|(pattern, format)| DatePattern {
            regex: Regex::new(pattern).expect("valid date regex"),
            format,
        })
        .collect()
    })
}

/// Finds the first real calendar date in `line`.
///
/// Patterns are tried in order (`YYYY-MM-DD`, `MM/DD/YYYY`, `MM-DD-YYYY`,
/// `YYYY/MM/DD`); a match that is not a valid date falls through to the
/// next pattern.
pub fn extract_date(line: &str) -> Option<NaiveDate> {
    date_patterns().iter().find_map(|pattern| {
        let found = pattern.regex.find(line)?;
        NaiveDate::parse_from_str(found.as_str(), pattern.format).ok()
    })
}

/// Stable merge sort that only asks `compare` about pairs, so it never
/// panics when the answers do not form a total order.
fn merge_sort_by<T, F>(mut items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let mut left = merge_sort_by(items, compare).into_iter().peekable();
    let mut right = merge_sort_by(right, compare).into_iter().peekable();

    let mut merged = Vec::with_capacity(left.len() + right.len());
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            _ => break,
        };
        if take_right {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    merged
}
