//! Markup stripping for pasted selections.
//!
//! Reduces a block of lightweight markup (Markdown as found in notes) to
//! plain prose while keeping its line structure. This is a chain of textual
//! substitutions, not a parser: each rule runs over the whole block in
//! multiline mode, and the order of the rules matters.

use regex::Regex;
use std::sync::OnceLock;

/// Ordered substitution rules applied by [`strip_markup`].
struct Rules {
    bold_stars: Regex,
    bold_underscores: Regex,
    italic_stars: Regex,
    italic_underscores: Regex,
    strikethrough: Regex,
    inline_code: Regex,
    image: Regex,
    link: Regex,
    heading: Regex,
    bullet: Regex,
    numbered: Regex,
    blockquote: Regex,
    fenced_code: Regex,
    table_row: Regex,
    horizontal_rule: Regex,
    footnote: Regex,
    task_marker: Regex,
    blank_run: Regex,
}

impl Rules {
    fn new() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("valid markup pattern");
        Rules {
            bold_stars: compile(r"\*\*(.*?)\*\*"),
            bold_underscores: compile(r"__(.*?)__"),
            italic_stars: compile(r"\*(.*?)\*"),
            italic_underscores: compile(r"_(.*?)_"),
            strikethrough: compile(r"~~(.*?)~~"),
            inline_code: compile(r"`(.*?)`"),
            image: compile(r"!\[([^\]]*)\]\([^)]*\)"),
            link: compile(r"\[([^\]]*)\]\([^)]*\)"),
            heading: compile(r"(?m)^[ \t]*#{1,6}[ \t]+"),
            bullet: compile(r"(?m)^[ \t]*[-*+][ \t]+"),
            numbered: compile(r"(?m)^[ \t]*\d+\.[ \t]+"),
            blockquote: compile(r"(?m)^[ \t]*>[ \t]+"),
            fenced_code: compile(r"(?m)^```[\s\S]*?```$"),
            table_row: compile(r"(?m)^[ \t]*\|.*\|[ \t]*$"),
            horizontal_rule: compile(r"(?m)^[ \t]*[-*]{3,}[ \t]*$"),
            footnote: compile(r"\[\^[^\]]*\]"),
            // The bullet itself is usually gone by now (see `bullet`).
            task_marker: compile(r"(?m)^[ \t]*(?:-[ \t]+)?\[[ xX]\][ \t]+"),
            blank_run: compile(r"\n\s*\n\s*\n"),
        }
    }
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(Rules::new)
}

/// Normalizes `\r\n` and lone `\r` line breaks to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Strips inline and block markup from `text`, leaving plain lines.
///
/// Never fails. Nested or overlapping markup (bold inside a link text, an
/// underscore inside an identifier) is handled only as well as the rule
/// order allows. The rule chain is repeated until the text stops changing,
/// so nested markers (`> > quote`) go in one call and stripping twice gives
/// the same result as stripping once.
pub fn strip_markup(text: &str) -> String {
    let mut current = normalize_line_endings(text);
    loop {
        // Every rule only deletes characters, so each pass is either a
        // no-op or strictly shorter.
        let next = strip_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn strip_pass(text: &str) -> String {
    let rules = rules();
    let mut out = text.to_string();

    // Fences first: the inline code rule would otherwise eat the backticks.
    out = rules.fenced_code.replace_all(&out, "").into_owned();

    let wrapped = [
        &rules.bold_stars,
        &rules.bold_underscores,
        &rules.italic_stars,
        &rules.italic_underscores,
        &rules.strikethrough,
        &rules.inline_code,
        &rules.image,
        &rules.link,
    ];
    for rule in wrapped {
        out = rule.replace_all(&out, "${1}").into_owned();
    }

    let removed = [
        &rules.heading,
        &rules.bullet,
        &rules.numbered,
        &rules.blockquote,
        &rules.table_row,
        &rules.horizontal_rule,
        &rules.footnote,
        &rules.task_marker,
    ];
    for rule in removed {
        out = rule.replace_all(&out, "").into_owned();
    }

    out = rules.blank_run.replace_all(&out, "\n\n").into_owned();

    out.split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}
