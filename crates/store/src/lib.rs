//! Persisted platswap state.
//!
//! Three independent JSON files live in one state directory:
//! - `Entries.json`: the ordered entry list
//! - `LastRequiredFiles.json`: the manifest installed by the last switch
//! - `Settings.json`: application settings
//!
//! Each save replaces its file atomically. Saves are not transactional
//! across files, so a crash between two saves can leave entries and the
//! manifest out of step.

use std::path::{Path, PathBuf};

use platswap_model::constants::{
    BACKUP_SUFFIX, ENTRIES_FILE, LAST_REQUIRED_FILES_FILE, SETTINGS_FILE, managed_files,
};
use platswap_model::{Entry, RequiredFiles, Settings};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Errors from state persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file} is corrupt: {source}")]
    Corrupt {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed state store rooted at one directory.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Creates a store over `dir`. Nothing is read until a load is requested.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the state directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries_path(&self) -> PathBuf {
        self.dir.join(ENTRIES_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(LAST_REQUIRED_FILES_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    /// Full paths of every file owned by the store.
    pub fn managed_paths(&self) -> Vec<PathBuf> {
        managed_files().iter().map(|f| self.dir.join(f)).collect()
    }

    /// Loads the entry list. A missing or blank file is an empty list.
    pub fn load_entries(&self) -> Result<Vec<Entry>, StoreError> {
        let entries: Option<Vec<Entry>> = read_json(&self.entries_path(), ENTRIES_FILE)?;
        let entries = entries.unwrap_or_default();
        debug!("loaded {} entr(ies) from {:?}", entries.len(), self.entries_path());
        Ok(entries)
    }

    pub fn save_entries(&self, entries: &[Entry]) -> Result<(), StoreError> {
        write_json(&self.entries_path(), &entries)?;
        debug!("persisted {} entr(ies) to {:?}", entries.len(), self.entries_path());
        Ok(())
    }

    /// Loads the manifest installed by the last switch, or `None` if no
    /// switch was ever recorded.
    pub fn load_manifest(&self) -> Result<Option<RequiredFiles>, StoreError> {
        read_json(&self.manifest_path(), LAST_REQUIRED_FILES_FILE)
    }

    pub fn save_manifest(&self, manifest: &RequiredFiles) -> Result<(), StoreError> {
        write_json(&self.manifest_path(), manifest)?;
        debug!(
            files = manifest.files.len(),
            directories = manifest.directories.len(),
            "persisted last required files"
        );
        Ok(())
    }

    /// Loads settings, falling back to defaults when the file is missing.
    pub fn load_settings(&self) -> Result<Settings, StoreError> {
        let settings: Option<Settings> = read_json(&self.settings_path(), SETTINGS_FILE)?;
        Ok(settings.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        write_json(&self.settings_path(), settings)?;
        debug!(path = %self.settings_path().display(), "settings saved");
        Ok(())
    }

    /// Parses every state file, returning the first failure.
    pub fn validate(&self) -> Result<(), StoreError> {
        self.load_entries()?;
        self.load_manifest()?;
        self.load_settings()?;
        Ok(())
    }

    /// Copies every state file to `<name>.bak` and removes the original.
    ///
    /// Used after a failed [`validate`](Self::validate) so the next start
    /// begins fresh. Returns the backup paths written.
    pub fn quarantine(&self) -> Result<Vec<PathBuf>, StoreError> {
        let backups = self.backup_all()?;
        for path in self.managed_paths() {
            remove_if_exists(&path)?;
        }
        tracing::warn!(count = backups.len(), "moved state files out of the way");
        Ok(backups)
    }

    /// Copies every existing state file to `<name>.bak`, overwriting older
    /// backups. Returns the backup paths written.
    pub fn backup_all(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut written = Vec::new();
        for path in self.managed_paths() {
            if path.is_file() {
                let target = backup_path(&path);
                std::fs::copy(&path, &target).map_err(|source| StoreError::Io {
                    path: target.clone(),
                    source,
                })?;
                written.push(target);
            }
        }
        Ok(written)
    }
}

/// Returns `path` with the backup suffix appended to its full name.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

fn read_json<T: DeserializeOwned>(path: &Path, file: &'static str) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if data.trim().is_empty() {
        return Ok(None);
    }
    // `null` is accepted for the same reason a blank file is.
    serde_json::from_str::<Option<T>>(&data).map_err(|source| StoreError::Corrupt { file, source })
}

/// Writes pretty JSON to a sibling temp file, then renames it over `path`.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, json).map_err(|source| StoreError::Io {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_if_exists(path: &Path) -> Result<(), StoreError> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
        _ => Ok(()),
    }
}
