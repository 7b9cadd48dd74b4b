//! Subcommand handlers.

use std::sync::Arc;

use anyhow::Context;
use platswap_engine::{Collaborators, EngineError, SwitchEngine};
use platswap_launcher::{ProcessManager, platform_sink};
use platswap_model::{Entry, normalize_label};
use platswap_store::StateStore;
use tracing::{error, info};

use crate::{Command, SettingsAction};

/// Exits with status 1 after moving corrupt state files aside.
pub fn validate_or_exit(store: &StateStore) {
    let Err(err) = store.validate() else {
        return;
    };
    error!(error = %err, "state files could not be read");
    match store.quarantine() {
        Ok(backups) => {
            for backup in backups {
                eprintln!("backed up {}", backup.display());
            }
        }
        Err(e) => error!(error = %e, "failed to back up state files"),
    }
    eprintln!(
        "{err}\n\nThe state files were moved aside with a .bak suffix. \
         Run platswap again to start fresh, or repair the backups and restore them."
    );
    std::process::exit(1);
}

pub fn validate(store: &StateStore) -> anyhow::Result<()> {
    store.validate()?;
    println!("state files in {} are valid", store.dir().display());
    Ok(())
}

fn open_engine(store: StateStore) -> anyhow::Result<SwitchEngine> {
    let processes = Arc::new(ProcessManager::new());
    let collaborators = Collaborators {
        sink: platform_sink(),
        guard: processes.clone(),
        launcher: processes,
    };
    SwitchEngine::open(store, collaborators).context("failed to load state")
}

pub fn dispatch(store: StateStore, command: Command) -> anyhow::Result<()> {
    let mut engine = open_engine(store)?;

    match command {
        Command::List => list(&engine),
        Command::Add {
            platform,
            label,
            launcher,
            flags,
        } => {
            let index = engine.add(Entry::new(platform, label.as_deref(), launcher, flags))?;
            println!("added {} at {index}", engine.entries()[index]);
        }
        Command::Copy { index } => {
            let copied = engine.copy(index)?;
            println!("copied to {copied}; set its platform with `platswap edit {copied} --platform <name>`");
        }
        Command::Edit {
            index,
            platform,
            label,
            launcher,
            flags,
            last_ran,
        } => {
            let mut draft = engine
                .entries()
                .get(index)
                .cloned()
                .ok_or(EngineError::NoSuchEntry(index))?;
            if let Some(platform) = platform {
                draft.platform = platform;
            }
            if let Some(label) = label {
                draft.label = normalize_label(Some(label));
            }
            if let Some(launcher) = launcher {
                draft.launcher = launcher;
            }
            if let Some(flags) = flags {
                draft.flags = flags;
            }
            if let Some(last_ran) = last_ran {
                draft.was_last_ran = last_ran;
            }
            engine.edit(index, draft)?;
            println!("updated {}", engine.entries()[index]);
        }
        Command::Delete { index } => {
            let removed = engine.delete(index)?;
            println!("deleted {removed}");
        }
        Command::Up { index } => report_move(engine.move_up(index)?),
        Command::Down { index } => report_move(engine.move_down(index)?),
        Command::Move { source, target } => report_move(engine.move_entry(source, target)?),
        Command::Run { index, elevate } => {
            engine.set_elevate(elevate);
            let outcome = engine.run(index)?;
            info!(entry = %outcome.entry, transition = ?outcome.transition, "switched");
            match outcome.launch.join() {
                Ok(result) => result?,
                Err(_) => anyhow::bail!("the launch thread panicked"),
            }
        }
        Command::Reset => {
            let entry = engine.reset()?;
            println!("reset; {entry} is no longer installed");
        }
        Command::Backup => {
            let path = engine.backup()?;
            println!("backup created at {}", path.display());
        }
        Command::Settings { action } => settings(&mut engine, action)?,
        Command::Validate => validate(engine.store())?,
    }
    Ok(())
}

fn list(engine: &SwitchEngine) {
    if engine.entries().is_empty() {
        println!("no entries");
        return;
    }
    for (index, entry) in engine.entries().iter().enumerate() {
        let marker = if entry.was_last_ran { '*' } else { ' ' };
        println!(
            "{index:>3} {marker} {:<32} {} {}",
            entry.to_string(),
            entry.launcher,
            entry.flags
        );
    }
}

fn report_move(moved: bool) {
    if moved {
        println!("moved");
    } else {
        println!("already in place");
    }
}

fn settings(engine: &mut SwitchEngine, action: SettingsAction) -> anyhow::Result<()> {
    match action {
        SettingsAction::Show => {
            let settings = engine.settings();
            println!("state directory:  {}", engine.store().dir().display());
            println!("root directory:   {}", settings.root_directory);
            match engine.layout() {
                Ok(layout) => println!("backups directory: {}", layout.backups_dir().display()),
                Err(_) => println!("backups directory: {}", settings.backups_directory),
            }
        }
        SettingsAction::Set { root, backups_dir } => {
            let mut settings = engine.settings().clone();
            if let Some(root) = root {
                settings.root_directory = root.to_string_lossy().into_owned();
            }
            if let Some(dir) = backups_dir {
                settings.backups_directory = dir.to_string_lossy().into_owned();
            }
            engine.update_settings(settings)?;
            println!("settings saved");
        }
    }
    Ok(())
}
