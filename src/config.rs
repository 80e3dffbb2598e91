//! Persisted defaults, stored as TOML in the XDG config directory.

use crate::format::FormatKind;
use crate::organize::OrganizeRules;
use crate::vault::NoteSort;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "config.toml";

/// User settings. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Vault directory; the XDG data directory is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault: Option<PathBuf>,

    /// Note used by `paste` and `organize` when none is named
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_note: Option<String>,

    pub paste_format: FormatKind,

    pub note_sort: NoteSort,

    /// Notes listed first by `notes`, in this order
    pub pinned: Vec<String>,

    pub organize: OrganizeRules,
}

impl Settings {
    /// Loads settings from `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(settings)
    }

    /// Writes settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Adds a note to the pinned list. Returns false if it was already there.
    pub fn pin(&mut self, note: &str) -> bool {
        let note = note.trim();
        if self.pinned.iter().any(|p| p == note) {
            return false;
        }
        self.pinned.push(note.to_string());
        true
    }

    /// Removes a note from the pinned list. Returns false if it was absent.
    pub fn unpin(&mut self, note: &str) -> bool {
        let note = note.trim();
        let before = self.pinned.len();
        self.pinned.retain(|p| p != note);
        self.pinned.len() != before
    }
}
