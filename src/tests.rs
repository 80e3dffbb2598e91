//! Behavioural tests spanning the formatting core.
//!
//! These exercise the documented guarantees of the pipeline end to end:
//! numbering continuity, markup normalisation, idempotent stripping and
//! line organisation.

use crate::format::*;
use crate::markup::strip_markup;
use crate::organize::*;
use crate::sequence::next_ordered_index;
use crate::vault::Vault;
use tempfile::TempDir;

const SAMPLES: &[&str] = &[
    "",
    "plain words",
    "**bold** item\n- already a bullet",
    "# Title\n\nSome *emphasis*, `code` and [a link](https://example.com).\n\n\n\n> a quote",
    "1. one\n2. two\n   3. three",
    "- [ ] open task\n- [x] done task",
    "![diagram](d.png) caption[^note]\n\n---\n\n| a | b |\n|---|---|",
    "```\nlet x = 1;\n```\nafter the fence",
    "  padded line  \r\n\ttabbed\r\n",
    "~~old~~ new __value__",
    "  > indented quote\n> > nested quote\n- - nested bullet",
    "  # indented heading\n  | a | b |\n1. 2. x",
    "para\n\n- item\nReleased in\n2024.\n***",
];

/// Verbatim output keeps every non-blank line, trimmed, in order
#[test]
fn test_verbatim_preserves_non_blank_lines() {
    let descriptor = FormatDescriptor::new(FormatKind::Verbatim);
    for sample in SAMPLES {
        let expected: Vec<&str> = sample
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let out = format_content(sample, &descriptor);
        let actual: Vec<&str> = if out.is_empty() {
            Vec::new()
        } else {
            out.split('\n').collect()
        };
        assert_eq!(actual, expected, "sample: {:?}", sample);
    }
}

/// Stripping already-stripped text changes nothing
#[test]
fn test_strip_is_idempotent() {
    for sample in SAMPLES {
        let once = strip_markup(sample);
        assert_eq!(strip_markup(&once), once, "sample: {:?}", sample);
    }
}

/// Numbering continues from the highest item already in the note
#[test]
fn test_ordered_numbering_continues() {
    let descriptor = FormatDescriptor::new(FormatKind::OrderedList);
    assert_eq!(
        format_content_continuous("x\ny", &descriptor, "1. a\n2. b"),
        "3. x\n4. y"
    );
}

/// With nothing numbered in the note, numbering starts at 1
#[test]
fn test_ordered_numbering_starts_at_one() {
    let descriptor = FormatDescriptor::new(FormatKind::OrderedList);
    assert_eq!(
        format_content_continuous("x\ny", &descriptor, ""),
        "1. x\n2. y"
    );
    assert_eq!(
        format_content_continuous("x", &descriptor, "no list here\n- bullet"),
        "1. x"
    );
}

/// Markdown bullets in the selection are not doubled by the list template
#[test]
fn test_unordered_list_normalizes_markdown_input() {
    let descriptor = FormatDescriptor::new(FormatKind::UnorderedList);
    assert_eq!(
        format_content("**bold** item\n- already a bullet", &descriptor),
        "- bold item\n- already a bullet"
    );
}

/// Dedup, trim and alphabetical sort with the blank line kept at the end
#[test]
fn test_organize_dedup_alphabetical() {
    let rules = OrganizeRules {
        sort_by: SortBy::Alphabetical,
        remove_duplicates: true,
        trim_whitespace: true,
    };
    assert_eq!(organize("b\na\nb\n", &rules), "a\nb\n");
}

/// Date sorting with undated lines falls back to text order without failing
#[test]
fn test_organize_date_mixed_lines() {
    let rules = OrganizeRules {
        sort_by: SortBy::Date,
        ..Default::default()
    };
    let out = organize("note b\n2024-02-01 second\nnote a\n2024-01-01 first", &rules);
    assert_eq!(out.lines().count(), 4);
    assert!(out.find("note a").unwrap() < out.find("note b").unwrap());
    assert!(out.find("2024-01-01 first").unwrap() < out.find("2024-02-01 second").unwrap());
}

/// Empty selections format to nothing for every kind
#[test]
fn test_empty_input_formats_to_empty() {
    for kind in [
        FormatKind::Verbatim,
        FormatKind::UnorderedList,
        FormatKind::OrderedList,
        FormatKind::Plain,
    ] {
        let descriptor = FormatDescriptor::new(kind);
        assert!(format_content("", &descriptor).is_empty());
        assert!(format_content_continuous("\n\n", &descriptor, "7. seven").is_empty());
    }
}

/// Two pastes into the same note keep one continuous ordered list
#[test]
fn test_repeated_pastes_keep_numbering() {
    let dir = TempDir::new().unwrap();
    let vault = Vault::open(dir.path()).unwrap();
    vault.create(None, "reading").unwrap();
    let descriptor = FormatDescriptor::new(FormatKind::OrderedList);

    for selection in ["Dune\nHyperion", "- Neuromancer", "Foundation"] {
        let existing = vault.read("reading").unwrap();
        let fragment = format_content_continuous(selection, &descriptor, &existing);
        vault.append("reading", &fragment).unwrap();
    }

    assert_eq!(
        vault.read("reading").unwrap(),
        "\n1. Dune\n2. Hyperion\n3. Neuromancer\n4. Foundation"
    );
    assert_eq!(next_ordered_index(&vault.read("reading").unwrap()), 5);
}

/// A manual edit to the note is picked up by the next paste
#[test]
fn test_numbering_follows_manual_edits() {
    let dir = TempDir::new().unwrap();
    let vault = Vault::open(dir.path()).unwrap();
    vault.create(None, "list").unwrap();
    vault.replace("list", "1. a\n10. jumped ahead").unwrap();

    let descriptor = FormatDescriptor::new(FormatKind::OrderedList);
    let existing = vault.read("list").unwrap();
    assert_eq!(
        format_content_continuous("b", &descriptor, &existing),
        "11. b"
    );
}
