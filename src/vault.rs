//! The vault: a directory of Markdown notes that pastes land in.
//!
//! Notes are addressed by their path relative to the vault root; a name
//! without an extension gets `.md` appended.

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

use crate::organize::text_cmp;

pub const NOTE_EXTENSION: &str = "md";

/// Ordering for note listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NoteSort {
    /// By file name
    #[default]
    Name,
    /// Most recently modified first
    Modified,
    /// Most recently created first
    Created,
}

/// A note found in the vault.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteInfo {
    /// Path relative to the vault root, with `/` separators
    pub path: String,
    pub name: String,
    pub basename: String,
    pub extension: String,
    pub modified: DateTime<Local>,
    pub created: DateTime<Local>,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    /// Opens the vault at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Vault { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a note name to its file path inside the vault.
    ///
    /// Names that would leave the vault (`..`, absolute paths) are refused
    /// with `InvalidInput`.
    pub fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name.trim());
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Note path leaves the vault: {}", name),
            ));
        }
        if relative.extension().is_some() {
            Ok(self.root.join(relative))
        } else {
            Ok(self.root.join(relative).with_extension(NOTE_EXTENSION))
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_ok_and(|path| path.is_file())
    }

    /// Current content of a note, or an empty string if it does not exist.
    pub fn read(&self, name: &str) -> io::Result<String> {
        let path = self.resolve(name)?;
        if !path.is_file() {
            return Ok(String::new());
        }
        fs::read_to_string(path)
    }

    /// Appends `fragment` as "existing content, line break, fragment".
    pub fn append(&self, name: &str, fragment: &str) -> io::Result<()> {
        let path = self.existing_note(name)?;
        let current = fs::read_to_string(&path)?;
        fs::write(&path, format!("{}\n{}", current, fragment))?;
        log::info!("appended {} bytes to {}", fragment.len(), path.display());
        Ok(())
    }

    /// Overwrites an existing note.
    pub fn replace(&self, name: &str, content: &str) -> io::Result<()> {
        let path = self.existing_note(name)?;
        fs::write(&path, content)?;
        log::info!("rewrote {}", path.display());
        Ok(())
    }

    /// Creates an empty note, optionally inside `folder`.
    pub fn create(&self, folder: Option<&str>, name: &str) -> io::Result<PathBuf> {
        let name = name.trim();
        if name.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Note name cannot be empty",
            ));
        }
        let relative = match folder.map(str::trim).filter(|f| !f.is_empty()) {
            Some(folder) => format!("{}/{}", folder.trim_end_matches('/'), name),
            None => name.to_string(),
        };
        let path = self.resolve(&relative)?;
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Note already exists: {}", relative),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, "")?;
        Ok(path)
    }

    /// Every Markdown note under the vault root, hidden entries skipped.
    pub fn list_notes(&self) -> io::Result<Vec<NoteInfo>> {
        let mut notes = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry));
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str()) == Some(NOTE_EXTENSION)
            {
                notes.push(self.note_info(entry.path(), &entry.metadata()?));
            }
        }
        Ok(notes)
    }

    fn note_info(&self, path: &Path, metadata: &fs::Metadata) -> NoteInfo {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        // Not every filesystem records a birth time.
        let created = metadata.created().unwrap_or(modified);
        let lossy = |s: Option<&std::ffi::OsStr>| {
            s.map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
        };

        NoteInfo {
            path: relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            name: lossy(path.file_name()),
            basename: lossy(path.file_stem()),
            extension: lossy(path.extension()),
            modified: DateTime::<Local>::from(modified),
            created: DateTime::<Local>::from(created),
            size: metadata.len(),
        }
    }

    fn existing_note(&self, name: &str) -> io::Result<PathBuf> {
        let path = self.resolve(name)?;
        if path.is_file() {
            Ok(path)
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Note not found: {}", name),
            ))
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    // The root itself may live under a dot directory.
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Sorts notes for display.
pub fn sort_notes(mut notes: Vec<NoteInfo>, order: NoteSort) -> Vec<NoteInfo> {
    match order {
        NoteSort::Name => notes.sort_by(|a, b| text_cmp(&a.basename, &b.basename)),
        NoteSort::Modified => notes.sort_by(|a, b| b.modified.cmp(&a.modified)),
        NoteSort::Created => notes.sort_by(|a, b| b.created.cmp(&a.created)),
    }
    notes
}

/// Keeps notes whose name or path contains `filter`, ignoring case.
pub fn search_notes(notes: Vec<NoteInfo>, filter: &str) -> Vec<NoteInfo> {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return notes;
    }
    notes
        .into_iter()
        .filter(|note| {
            note.basename.to_lowercase().contains(&needle)
                || note.path.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Splits notes into (pinned, rest), pinned ones in the order given.
pub fn partition_pinned(
    notes: Vec<NoteInfo>,
    pinned: &[String],
    vault: &Vault,
) -> (Vec<NoteInfo>, Vec<NoteInfo>) {
    let pinned_paths: Vec<PathBuf> = pinned
        .iter()
        .filter_map(|name| vault.resolve(name).ok())
        .collect();
    let pin_position = |note: &NoteInfo| {
        let path = vault.resolve(&note.path).ok()?;
        pinned_paths.iter().position(|p| *p == path)
    };
    let (mut first, rest): (Vec<NoteInfo>, Vec<NoteInfo>) = notes
        .into_iter()
        .partition(|note| pin_position(note).is_some());
    first.sort_by_key(|note| pin_position(note));
    (first, rest)
}

/// Human readable size, e.g. `0 B`, `512 B`, `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Coarse "time ago" label relative to `now`.
pub fn relative_time(instant: DateTime<Local>, now: DateTime<Local>) -> String {
    let elapsed = now.signed_duration_since(instant);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };
    if elapsed.num_days() > 0 {
        plural(elapsed.num_days(), "day")
    } else if elapsed.num_hours() > 0 {
        plural(elapsed.num_hours(), "hour")
    } else if elapsed.num_minutes() > 0 {
        plural(elapsed.num_minutes(), "minute")
    } else {
        "just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn vault() -> (TempDir, Vault) {
        let dir = TempDir::new().unwrap();
        let vault = Vault::open(dir.path()).unwrap();
        (dir, vault)
    }

    #[test]
    fn test_resolve_adds_extension() {
        let (_dir, vault) = vault();
        assert_eq!(vault.resolve("inbox").unwrap(), vault.root().join("inbox.md"));
        assert_eq!(vault.resolve("inbox.md").unwrap(), vault.root().join("inbox.md"));
        assert_eq!(
            vault.resolve("work/log").unwrap(),
            vault.root().join("work").join("log.md")
        );
    }

    #[test]
    fn test_names_cannot_leave_the_vault() {
        let (dir, vault) = vault();
        for name in ["../outside", "work/../../outside", "/tmp/outside"] {
            assert_eq!(
                vault.resolve(name).unwrap_err().kind(),
                io::ErrorKind::InvalidInput,
                "name: {}",
                name
            );
        }
        assert_eq!(
            vault.create(None, "../outside").unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
        assert_eq!(
            vault.create(Some(".."), "outside").unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
        assert!(!vault.exists("../outside"));
        assert!(vault.append("../outside", "x").is_err());
        assert!(!dir.path().parent().unwrap().join("outside.md").exists());
    }

    #[test]
    fn test_read_missing_note_is_empty() {
        let (_dir, vault) = vault();
        assert_eq!(vault.read("nothing").unwrap(), "");
    }

    #[test]
    fn test_append_joins_with_single_line_break() {
        let (_dir, vault) = vault();
        vault.create(None, "inbox").unwrap();
        vault.append("inbox", "first").unwrap();
        vault.append("inbox", "second").unwrap();
        assert_eq!(vault.read("inbox").unwrap(), "\nfirst\nsecond");
    }

    #[test]
    fn test_append_to_missing_note_fails() {
        let (_dir, vault) = vault();
        let err = vault.append("ghost", "text").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_replace_overwrites() {
        let (_dir, vault) = vault();
        vault.create(None, "a").unwrap();
        vault.append("a", "x").unwrap();
        vault.replace("a", "y").unwrap();
        assert_eq!(vault.read("a").unwrap(), "y");
        assert!(vault.replace("b", "z").is_err());
    }

    #[test]
    fn test_create_in_folder_and_refuse_duplicates() {
        let (_dir, vault) = vault();
        let path = vault.create(Some("projects/"), "plan").unwrap();
        assert_eq!(path, vault.root().join("projects").join("plan.md"));
        let err = vault.create(Some("projects"), "plan").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(
            vault.create(None, "  ").unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_list_notes_recurses_and_skips_hidden() {
        let (dir, vault) = vault();
        vault.create(None, "b").unwrap();
        vault.create(Some("sub"), "a").unwrap();
        fs::write(dir.path().join("readme.txt"), "x").unwrap();
        fs::create_dir_all(dir.path().join(".trash")).unwrap();
        fs::write(dir.path().join(".trash/old.md"), "x").unwrap();

        let notes = sort_notes(vault.list_notes().unwrap(), NoteSort::Name);
        let paths: Vec<&str> = notes.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["sub/a.md", "b.md"]);
        assert_eq!(notes[0].basename, "a");
        assert_eq!(notes[0].extension, "md");
        assert_eq!(notes[0].name, "a.md");
    }

    #[test]
    fn test_list_notes_under_dot_directory_root() {
        let dir = TempDir::new().unwrap();
        let vault = Vault::open(dir.path().join(".config").join("vault")).unwrap();
        vault.create(None, "inbox").unwrap();
        let notes = vault.list_notes().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].path, "inbox.md");
    }

    #[test]
    fn test_search_notes() {
        let (_dir, vault) = vault();
        vault.create(None, "Reading").unwrap();
        vault.create(Some("work"), "todo").unwrap();
        let notes = vault.list_notes().unwrap();
        assert_eq!(search_notes(notes.clone(), "read").len(), 1);
        assert_eq!(search_notes(notes.clone(), "WORK").len(), 1);
        assert_eq!(search_notes(notes.clone(), "  ").len(), 2);
        assert!(search_notes(notes, "zzz").is_empty());
    }

    #[test]
    fn test_partition_pinned_keeps_pin_order() {
        let (_dir, vault) = vault();
        for name in ["a", "b", "c"] {
            vault.create(None, name).unwrap();
        }
        let notes = sort_notes(vault.list_notes().unwrap(), NoteSort::Name);
        let pinned = vec!["c".to_string(), "a.md".to_string()];
        let (first, rest) = partition_pinned(notes, &pinned, &vault);
        let first: Vec<&str> = first.iter().map(|n| n.basename.as_str()).collect();
        assert_eq!(first, vec!["c", "a"]);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].basename, "b");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
    }

    #[test]
    fn test_relative_time() {
        let now = Local::now();
        assert_eq!(relative_time(now, now), "just now");
        assert_eq!(relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_time(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(relative_time(now - Duration::days(3), now), "3 days ago");
    }
}
