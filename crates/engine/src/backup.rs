//! Timestamped backups of platforms, saves and state files.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use platswap_file_ops::{FileOpsError, copy_dir_recursive, ensure_dir};
use platswap_model::constants::{PLATFORMS_DIR, SAVES_DIR};
use platswap_store::StateStore;
use tracing::info;

use crate::{EngineError, InstanceGuard, PathLayout};

/// Formats a backup directory name: `YYYY-MM-DD-HHMM-SS`.
pub fn backup_name(time: NaiveDateTime) -> String {
    time.format("%Y-%m-%d-%H%M-%S").to_string()
}

/// Copies `Platforms/`, `Saves/` and the state files into a new directory
/// named `name` under the backups root. Returns the backup directory.
///
/// Refuses while the game runs, when any source is missing, or when a
/// backup with the same name already exists.
pub fn create_backup(
    layout: &PathLayout,
    store: &StateStore,
    guard: &dyn InstanceGuard,
    name: &str,
) -> Result<PathBuf, EngineError> {
    let platforms = layout.platforms_dir();
    let saves = layout.saves_dir();
    for dir in [&platforms, &saves] {
        if !dir.is_dir() {
            return Err(EngineError::BackupSourceMissing(dir.clone()));
        }
    }
    let state_files = store.managed_paths();
    if let Some(missing) = state_files.iter().find(|p| !p.is_file()) {
        return Err(EngineError::BackupSourceMissing(missing.clone()));
    }

    if guard.is_running() {
        return Err(EngineError::GameRunning);
    }

    let backups_root = layout.backups_dir();
    ensure_dir(&backups_root)?;
    let target = backups_root.join(name);
    if target.exists() {
        return Err(EngineError::BackupExists(target));
    }
    ensure_dir(&target)?;

    copy_dir_recursive(&platforms, &target.join(PLATFORMS_DIR))?;
    copy_dir_recursive(&saves, &target.join(SAVES_DIR))?;
    for file in &state_files {
        copy_state_file(file, &target)?;
    }

    info!(path = %target.display(), "backup created");
    Ok(target)
}

fn copy_state_file(file: &Path, target_dir: &Path) -> Result<(), FileOpsError> {
    let Some(name) = file.file_name() else {
        return Ok(());
    };
    let to = target_dir.join(name);
    std::fs::copy(file, &to)
        .map(|_| ())
        .map_err(|source| FileOpsError::Copy {
            from: file.to_path_buf(),
            to,
            source,
        })
}
