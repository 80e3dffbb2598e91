//! smartpaste - Format selected text and append it to a note
//!
//! Reads a selection from the command line or stdin, formats it (plain
//! text, bullets, continuously numbered lists or a custom template) and
//! appends it to a Markdown note in the vault.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smartpaste::config::{Settings, CONFIG_FILENAME};
use smartpaste::format::FormatKind;
use smartpaste::organize::SortBy;
use smartpaste::vault::{NoteSort, Vault};
use std::path::PathBuf;
use xdg::BaseDirectories;

mod commands;

/// Command-line interface structure for smartpaste
#[derive(Parser)]
#[command(name = "smartpaste")]
#[command(about = "Format selected text and append it to Markdown notes", long_about = None)]
#[command(version)]
struct Cli {
    /// Vault directory (overrides the config file)
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Formatting flags shared by `paste` and `format`
#[derive(clap::Args)]
struct FormatArgs {
    /// Text to format; read from stdin when omitted
    #[arg(short, long, allow_hyphen_values = true)]
    text: Option<String>,
    /// Output format (defaults to the configured paste format)
    #[arg(short, long, value_enum)]
    format: Option<FormatKind>,
    /// Custom per-line template, e.g. "- [ ] {content}\n"
    #[arg(long, allow_hyphen_values = true)]
    template: Option<String>,
    /// Prepend an "Added" timestamp comment
    #[arg(long)]
    timestamp: bool,
    /// Prepend a source comment naming where the text came from
    #[arg(long)]
    source: Option<String>,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Format text and append it to a note
    #[command(aliases = ["p", "append"])]
    Paste {
        /// Target note (defaults to the configured default note)
        note: Option<String>,
        #[command(flatten)]
        args: FormatArgs,
    },
    /// Format text and print it without touching any note
    Format {
        #[command(flatten)]
        args: FormatArgs,
        /// Continue ordered-list numbering from this note
        #[arg(long)]
        continue_from: Option<String>,
    },
    /// Trim, de-duplicate and sort the lines of a note
    Organize {
        /// Note to organize (defaults to the configured default note)
        note: Option<String>,
        #[arg(short, long, value_enum)]
        sort: Option<SortBy>,
        /// Keep repeated lines
        #[arg(long)]
        keep_duplicates: bool,
        /// Keep leading and trailing whitespace
        #[arg(long)]
        keep_whitespace: bool,
        /// Print the result instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// List notes in the vault, pinned ones first
    #[command(alias = "ls")]
    Notes {
        /// Only show notes whose name or path contains this text
        filter: Option<String>,
        #[arg(short, long, value_enum)]
        sort: Option<NoteSort>,
    },
    /// Create an empty note
    New {
        name: String,
        /// Folder inside the vault
        #[arg(long)]
        folder: Option<String>,
    },
    /// Pin a note to the top of listings
    Pin { note: String },
    /// Remove a note from the pinned list
    Unpin { note: String },
}

/// Entry point: sets up logging, loads settings from the XDG config
/// directory, opens the vault and dispatches to the command handlers.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let base = BaseDirectories::with_prefix("smartpaste");

    let config_path = base
        .place_config_file(CONFIG_FILENAME)
        .context("Failed to create config directory")?;
    let mut settings = Settings::load(&config_path)?;

    let vault_root = match cli.vault.clone().or_else(|| settings.vault.clone()) {
        Some(root) => root,
        None => base
            .create_data_directory("notes")
            .context("Failed to create data directory")?,
    };
    let vault = Vault::open(&vault_root)
        .with_context(|| format!("Failed to open vault {}", vault_root.display()))?;
    log::debug!("vault at {}, config at {}", vault_root.display(), config_path.display());

    match cli.command {
        Commands::Paste { note, args } => {
            let note = commands::target_note(note, &settings)?;
            commands::paste(&vault, &settings, &note, &args)
        }
        Commands::Format { args, continue_from } => {
            commands::format(&vault, &settings, &args, continue_from.as_deref())
        }
        Commands::Organize {
            note,
            sort,
            keep_duplicates,
            keep_whitespace,
            dry_run,
        } => {
            let note = commands::target_note(note, &settings)?;
            let mut rules = settings.organize;
            if let Some(sort) = sort {
                rules.sort_by = sort;
            }
            rules.remove_duplicates &= !keep_duplicates;
            rules.trim_whitespace &= !keep_whitespace;
            commands::organize_note(&vault, &note, &rules, dry_run)
        }
        Commands::Notes { filter, sort } => commands::list_notes(
            &vault,
            &settings,
            filter.as_deref(),
            sort.unwrap_or(settings.note_sort),
        ),
        Commands::New { name, folder } => commands::new_note(&vault, folder.as_deref(), &name),
        Commands::Pin { note } => commands::pin(&mut settings, &config_path, &note, true),
        Commands::Unpin { note } => commands::pin(&mut settings, &config_path, &note, false),
    }
}
