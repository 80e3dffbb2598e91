//! Command implementations for smartpaste.
//!
//! Each command reads what it needs from the vault, hands plain strings to
//! the formatting core, and writes the result back. Status lines go to
//! stdout in colour; failures bubble up as `anyhow` errors.

use crate::FormatArgs;
use anyhow::{bail, Context, Result};
use chrono::Local;
use smartpaste::config::Settings;
use smartpaste::format::{detect_content_kind, format_with, Annotations, FormatDescriptor};
use smartpaste::organize::{organize, OrganizeRules};
use smartpaste::vault::{
    format_file_size, partition_pinned, relative_time, search_notes, sort_notes, NoteInfo,
    NoteSort, Vault,
};
use std::io::{self, Read};
use std::path::Path;
use termion::color;

const STDIN_SOURCE: &str = "stdin";

/// Picks the note named on the command line, else the configured default.
pub fn target_note(note: Option<String>, settings: &Settings) -> Result<String> {
    note.or_else(|| settings.default_note.clone())
        .filter(|n| !n.trim().is_empty())
        .context("No note given and no default_note configured")
}

fn read_selection(args: &FormatArgs) -> Result<String> {
    match &args.text {
        Some(text) => Ok(text.clone()),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read text from stdin")?;
            Ok(text)
        }
    }
}

fn descriptor(args: &FormatArgs, settings: &Settings) -> FormatDescriptor {
    FormatDescriptor {
        kind: args.format.unwrap_or(settings.paste_format),
        custom_template: args.template.clone(),
        add_timestamp: args.timestamp,
        add_source: args.source.is_some(),
    }
}

fn annotations(args: &FormatArgs) -> Annotations {
    Annotations::now(args.source.as_deref().unwrap_or(STDIN_SOURCE))
}

/// Formats the selection and appends it to `note`, continuing any ordered
/// list the note already has.
pub fn paste(vault: &Vault, settings: &Settings, note: &str, args: &FormatArgs) -> Result<()> {
    let text = read_selection(args)?;
    if text.trim().is_empty() {
        bail!("Nothing to paste: the selection is empty");
    }
    let descriptor = descriptor(args, settings);
    log::debug!("selection looks like {:?}", detect_content_kind(&text));

    if !vault.exists(note) {
        bail!(
            "Note not found: {} (create it with `smartpaste new {}`)",
            note,
            note
        );
    }
    let existing = vault
        .read(note)
        .with_context(|| format!("Failed to read note {}", note))?;
    let formatted = format_with(&text, &descriptor, Some(&existing), &annotations(args));

    if formatted.trim().is_empty() {
        bail!("Nothing to paste: no text left after formatting");
    }

    vault
        .append(note, &formatted)
        .with_context(|| format!("Failed to append to note {}", note))?;

    println!(
        "{}✓ Pasted {} line(s) into {}{}",
        color::Fg(color::Green),
        formatted.lines().count(),
        note,
        color::Fg(color::Reset)
    );
    Ok(())
}

/// Prints the formatted selection without writing anything.
pub fn format(
    vault: &Vault,
    settings: &Settings,
    args: &FormatArgs,
    continue_from: Option<&str>,
) -> Result<()> {
    let text = read_selection(args)?;
    let descriptor = descriptor(args, settings);
    let existing = match continue_from {
        Some(note) => Some(
            vault
                .read(note)
                .with_context(|| format!("Failed to read note {}", note))?,
        ),
        None => None,
    };

    let formatted = format_with(&text, &descriptor, existing.as_deref(), &annotations(args));
    println!("{}", formatted);
    Ok(())
}

/// Organizes a note's lines in place, or prints the result on a dry run.
pub fn organize_note(vault: &Vault, note: &str, rules: &OrganizeRules, dry_run: bool) -> Result<()> {
    if !vault.exists(note) {
        bail!("Note not found: {}", note);
    }
    let content = vault
        .read(note)
        .with_context(|| format!("Failed to read note {}", note))?;
    let organized = organize(&content, rules);

    if dry_run {
        println!("{}", organized);
        return Ok(());
    }

    if organized == content {
        println!(
            "{}{} is already organized.{}",
            color::Fg(color::Yellow),
            note,
            color::Fg(color::Reset)
        );
        return Ok(());
    }

    vault
        .replace(note, &organized)
        .with_context(|| format!("Failed to rewrite note {}", note))?;
    println!(
        "{}✓ Organized {} ({} lines){}",
        color::Fg(color::Green),
        note,
        organized.lines().count(),
        color::Fg(color::Reset)
    );
    Ok(())
}

/// Lists notes, pinned ones first, with size and age.
pub fn list_notes(
    vault: &Vault,
    settings: &Settings,
    filter: Option<&str>,
    order: NoteSort,
) -> Result<()> {
    let notes = vault
        .list_notes()
        .with_context(|| format!("Failed to list notes in {}", vault.root().display()))?;
    let notes = sort_notes(search_notes(notes, filter.unwrap_or("")), order);

    if notes.is_empty() {
        match filter {
            Some(filter) => println!(
                "{}No notes found matching filter: \"{}\"{}",
                color::Fg(color::Yellow),
                filter,
                color::Fg(color::Reset)
            ),
            None => println!(
                "{}No notes yet.{}",
                color::Fg(color::Yellow),
                color::Fg(color::Reset)
            ),
        }
        return Ok(());
    }

    let (pinned, rest) = partition_pinned(notes, &settings.pinned, vault);
    let now = Local::now();
    let print = |note: &NoteInfo, marker: &str| {
        println!(
            "{}{} {:<40}{} {:>10}  {}",
            color::Fg(color::Cyan),
            marker,
            note.path,
            color::Fg(color::Reset),
            format_file_size(note.size),
            relative_time(note.modified, now)
        );
    };

    for note in &pinned {
        print(note, "*");
    }
    for note in &rest {
        print(note, " ");
    }
    Ok(())
}

/// Creates an empty note.
pub fn new_note(vault: &Vault, folder: Option<&str>, name: &str) -> Result<()> {
    let path = vault
        .create(folder, name)
        .with_context(|| format!("Failed to create note {}", name))?;
    println!(
        "{}✓ Created {}{}",
        color::Fg(color::Green),
        path.display(),
        color::Fg(color::Reset)
    );
    Ok(())
}

/// Adds or removes a note from the pinned list and saves the settings.
pub fn pin(settings: &mut Settings, config_path: &Path, note: &str, pin: bool) -> Result<()> {
    let changed = if pin {
        settings.pin(note)
    } else {
        settings.unpin(note)
    };

    if !changed {
        let state = if pin { "already pinned" } else { "not pinned" };
        println!(
            "{}{} is {}.{}",
            color::Fg(color::Yellow),
            note,
            state,
            color::Fg(color::Reset)
        );
        return Ok(());
    }

    settings.save(config_path)?;
    let verb = if pin { "Pinned" } else { "Unpinned" };
    println!(
        "{}✓ {} {}{}",
        color::Fg(color::Green),
        verb,
        note,
        color::Fg(color::Reset)
    );
    Ok(())
}
