//! platswap entry point.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use platswap_store::StateStore;
use tracing_subscriber::EnvFilter;

/// Switch between several game installations sharing one install root.
#[derive(Debug, Parser)]
#[command(name = "platswap", version)]
struct Cli {
    /// Directory holding Entries.json, LastRequiredFiles.json and Settings.json.
    #[arg(long, global = true, env = "PLATSWAP_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List entries; `*` marks the last ran one.
    List,
    /// Add an entry for an existing platform directory.
    Add {
        platform: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long, default_value = "Game.exe")]
        launcher: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        flags: String,
    },
    /// Copy an entry; the copy has no platform until edited.
    Copy { index: usize },
    /// Change an entry. Renaming a platform or label renames its directories.
    Edit {
        index: usize,
        #[arg(long)]
        platform: Option<String>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        launcher: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        flags: Option<String>,
        #[arg(long)]
        last_ran: Option<bool>,
    },
    /// Delete an entry.
    Delete { index: usize },
    /// Move an entry one position up.
    Up { index: usize },
    /// Move an entry one position down.
    Down { index: usize },
    /// Move an entry before the entry at `target` (use the entry count for the end).
    Move { source: usize, target: usize },
    /// Switch to an entry, launch the game and wait for it to exit.
    Run {
        index: usize,
        /// Launch with the elevated token of this process.
        #[arg(long)]
        elevate: bool,
    },
    /// Remove the installed platform files from the root.
    Reset,
    /// Back up platforms, saves and state files.
    Backup,
    /// Show or change settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Check that every state file parses.
    Validate,
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    Show,
    Set {
        /// Game install root.
        #[arg(long)]
        root: Option<PathBuf>,
        /// Backups root (defaults to `<root>/Backups`).
        #[arg(long)]
        backups_dir: Option<PathBuf>,
    },
}

impl Command {
    /// Commands that only read state may run next to another instance.
    fn is_read_only(&self) -> bool {
        matches!(
            self,
            Command::List
                | Command::Validate
                | Command::Settings {
                    action: SettingsAction::Show
                }
        )
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let state_dir = config::state_dir(cli.state_dir.as_deref())?;
    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        state_dir = %state_dir.display(),
        "starting platswap"
    );
    let store = StateStore::new(state_dir);

    if let Command::Validate = cli.command {
        return commands::validate(&store);
    }

    commands::validate_or_exit(&store);

    if !cli.command.is_read_only() && platswap_launcher::is_another_instance_running() {
        anyhow::bail!("platswap is already running");
    }

    commands::dispatch(store, cli.command)
}
