//! Formatting of selected text before it is appended to a note.
//!
//! The pipeline is: clean, optionally strip markup, apply a template, then
//! optionally prepend source and timestamp comments. Everything here is a
//! pure string transform; the caller supplies the destination's current
//! content when ordered lists should continue its numbering.

use crate::markup::{normalize_line_endings, strip_markup};
use crate::sequence::next_ordered_index;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const CONTENT: &str = "{content}";
pub const INDEX: &str = "{index}";
pub const TIMESTAMP: &str = "{timestamp}";
pub const DATE: &str = "{date}";
pub const TIME: &str = "{time}";

/// Source reference used when the caller has none to offer.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// How pasted lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FormatKind {
    /// Keep the text as it is, one trimmed line per input line
    #[default]
    #[serde(alias = "newline")]
    #[value(alias = "newline")]
    Verbatim,
    /// Render each line as a `- ` bullet
    #[value(alias = "ul")]
    UnorderedList,
    /// Render each line as a numbered item
    #[value(alias = "ol")]
    OrderedList,
    /// Strip markup and keep plain prose
    Plain,
}

impl FormatKind {
    /// The built-in template for this kind.
    pub fn template(self) -> &'static str {
        match self {
            FormatKind::Verbatim => "{content}",
            FormatKind::UnorderedList => "- {content}",
            FormatKind::OrderedList => "{index}. {content}",
            FormatKind::Plain => "{content}",
        }
    }

    fn strips_markup(self) -> bool {
        matches!(
            self,
            FormatKind::Plain | FormatKind::UnorderedList | FormatKind::OrderedList
        )
    }
}

/// Per-call formatting options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub kind: FormatKind,
    pub custom_template: Option<String>,
    pub add_timestamp: bool,
    pub add_source: bool,
}

impl FormatDescriptor {
    pub fn new(kind: FormatKind) -> Self {
        FormatDescriptor {
            kind,
            ..Default::default()
        }
    }
}

/// Values embedded by timestamp and source annotations.
#[derive(Debug, Clone)]
pub struct Annotations {
    pub now: DateTime<Local>,
    pub source: String,
}

impl Annotations {
    /// Annotations stamped with the current local time.
    pub fn now(source: impl Into<String>) -> Self {
        Annotations {
            now: Local::now(),
            source: source.into(),
        }
    }
}

/// Rough classification of a selection, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    List,
    Code,
    Mixed,
}

/// Normalizes line endings and trims the block.
pub fn clean_content(text: &str) -> String {
    normalize_line_endings(text).trim().to_string()
}

/// Formats `text` with numbering that always starts at 1.
pub fn format_content(text: &str, descriptor: &FormatDescriptor) -> String {
    format_with(text, descriptor, None, &Annotations::now(UNKNOWN_SOURCE))
}

/// Formats `text`, continuing ordered-list numbering from `existing`.
pub fn format_content_continuous(
    text: &str,
    descriptor: &FormatDescriptor,
    existing: &str,
) -> String {
    format_with(
        text,
        descriptor,
        Some(existing),
        &Annotations::now(UNKNOWN_SOURCE),
    )
}

/// Runs the whole pipeline with explicit annotation values.
///
/// `existing` is the destination's current content; when it is present and
/// non-empty, ordered lists (and custom templates using `{index}`) continue
/// from the highest number already in it.
pub fn format_with(
    text: &str,
    descriptor: &FormatDescriptor,
    existing: Option<&str>,
    annotations: &Annotations,
) -> String {
    let content = if descriptor.kind.strips_markup() {
        clean_content(&strip_markup(text))
    } else {
        clean_content(text)
    };

    let start = match existing {
        Some(existing) if !existing.is_empty() => next_ordered_index(existing),
        _ => 1,
    };

    let mut formatted = match descriptor.custom_template.as_deref() {
        Some(template) => apply_custom_template(&content, template, start, annotations),
        None => {
            let template = descriptor.kind.template();
            if descriptor.kind == FormatKind::OrderedList {
                apply_template(&content, template, start)
            } else {
                apply_template(&content, template, 1)
            }
        }
    };

    log::debug!(
        "formatted {:?} selection: {} input lines, {} output lines, numbering from {}",
        descriptor.kind,
        text.lines().count(),
        formatted.lines().count(),
        start
    );

    if descriptor.add_timestamp {
        formatted = format!(
            "<!-- Added: {} -->\n{}",
            annotations.now.format("%Y-%m-%d %H:%M:%S"),
            formatted
        );
    }
    if descriptor.add_source {
        formatted = format!("<!-- Source: {} -->\n{}", annotations.source, formatted);
    }

    formatted
}

fn non_blank_lines(content: &str) -> impl Iterator<Item = &str> {
    content.split('\n').filter(|line| !line.trim().is_empty())
}

/// Applies a line template to `content`, numbering from `start`.
pub fn apply_template(content: &str, template: &str, start: usize) -> String {
    if !template.contains(CONTENT) {
        return format!("{}{}", template, content);
    }

    if template == CONTENT {
        return content
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
    }

    non_blank_lines(content)
        .enumerate()
        .map(|(offset, line)| {
            template
                .replace(INDEX, &start.saturating_add(offset).to_string())
                .replace(CONTENT, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Applies a user template to each non-blank line, with no separator.
///
/// Custom templates carry their own line terminator when they want one.
pub fn apply_custom_template(
    content: &str,
    template: &str,
    start: usize,
    annotations: &Annotations,
) -> String {
    let timestamp = annotations
        .now
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    let date = annotations.now.format("%Y-%m-%d").to_string();
    let time = annotations.now.format("%H:%M:%S").to_string();

    non_blank_lines(content)
        .enumerate()
        .map(|(offset, line)| {
            template
                .replace(TIMESTAMP, &timestamp)
                .replace(DATE, &date)
                .replace(TIME, &time)
                .replace(INDEX, &start.saturating_add(offset).to_string())
                .replace(CONTENT, line)
        })
        .collect()
}

/// Classifies a selection as list, code, plain text or a mix.
pub fn detect_content_kind(text: &str) -> ContentKind {
    let lines: Vec<&str> = non_blank_lines(text).collect();
    if lines.is_empty() {
        return ContentKind::Text;
    }

    let is_code = |line: &&str| line.starts_with('`') || line.starts_with("    ");
    let is_list_item = |line: &&str| {
        let mut chars = line.chars();
        match chars.next() {
            Some('-' | '*' | '+') => chars.next().is_some_and(char::is_whitespace),
            Some(c) if c.is_ascii_digit() => {
                let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
                rest.strip_prefix('.')
                    .and_then(|rest| rest.chars().next())
                    .is_some_and(char::is_whitespace)
            }
            _ => false,
        }
    };

    if lines.iter().any(is_code) {
        ContentKind::Code
    } else if lines.iter().any(is_list_item) {
        ContentKind::List
    } else {
        ContentKind::Mixed
    }
}
