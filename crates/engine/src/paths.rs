//! Directory layout under the game install root.

use std::path::{Path, PathBuf};

use platswap_model::constants::{DEFAULT_BACKUPS_DIR, PLATFORMS_DIR, SAVES_DIR};
use platswap_model::{Entry, Settings};

use crate::EngineError;

/// Resolves every path the engine touches from the install root.
///
/// ```text
/// <root>/
///   Platforms/<platform>/...
///   Saves/<platform>/[<label>/]
///   <launcher>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathLayout {
    root: PathBuf,
    backups: Option<PathBuf>,
}

impl PathLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            backups: None,
        }
    }

    /// Builds the layout from settings, failing if no root is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, EngineError> {
        let root = settings.root_dir().ok_or(EngineError::RootNotSet)?;
        Ok(Self {
            root,
            backups: settings.backups_dir(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn platforms_dir(&self) -> PathBuf {
        self.root.join(PLATFORMS_DIR)
    }

    pub fn saves_dir(&self) -> PathBuf {
        self.root.join(SAVES_DIR)
    }

    pub fn platform_dir(&self, platform: &str) -> PathBuf {
        self.platforms_dir().join(platform)
    }

    /// Save directory for a platform, without any label.
    pub fn platform_save_dir(&self, platform: &str) -> PathBuf {
        self.saves_dir().join(platform)
    }

    /// Save directory for an entry: `Saves/<platform>[/<label>]`.
    pub fn save_dir(&self, entry: &Entry) -> PathBuf {
        let dir = self.platform_save_dir(&entry.platform);
        match &entry.label {
            Some(label) => dir.join(label),
            None => dir,
        }
    }

    /// Launcher executable, resolved against the root.
    pub fn launcher_path(&self, entry: &Entry) -> PathBuf {
        self.root.join(&entry.launcher)
    }

    /// Backups root: the configured one, or `<root>/Backups`.
    pub fn backups_dir(&self) -> PathBuf {
        self.backups
            .clone()
            .unwrap_or_else(|| self.root.join(DEFAULT_BACKUPS_DIR))
    }

    /// Name of the backups directory when it sits directly in the root.
    ///
    /// Such a directory must be protected like the layout directories.
    pub fn backups_name_in_root(&self) -> Option<String> {
        let dir = self.backups_dir();
        if dir.parent() != Some(self.root.as_path()) {
            return None;
        }
        dir.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
    }
}
