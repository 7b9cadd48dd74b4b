//! Names the switcher must never install over or delete.

use std::path::{Component, Path};

use platswap_model::RequiredFiles;
use platswap_model::constants::{
    CORE_ARCHIVES, EXPANSION_ARCHIVES, LEGACY_LANGUAGE_FILE, LEGACY_SAVE_DIR, PLATFORMS_DIR,
    SAVES_DIR, managed_files,
};

/// The fixed set of protected top-level names.
///
/// Matching is ASCII case-insensitive, like the filesystem the game runs on.
#[derive(Debug, Clone)]
pub struct ProtectedSet {
    names: Vec<String>,
}

impl Default for ProtectedSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtectedSet {
    /// Builds the standard set: layout directories, core and expansion
    /// archives, the legacy language file and platswap's own state files.
    pub fn new() -> Self {
        let mut names: Vec<String> = [PLATFORMS_DIR, SAVES_DIR, LEGACY_SAVE_DIR]
            .into_iter()
            .chain(CORE_ARCHIVES.iter().copied())
            .chain(std::iter::once(LEGACY_LANGUAGE_FILE))
            .chain(EXPANSION_ARCHIVES.iter().copied())
            .map(str::to_string)
            .collect();
        names.extend(managed_files().into_iter().map(str::to_string));
        Self { names }
    }

    /// Adds more protected names (e.g. a backups directory kept in the root).
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(extra.into_iter().map(Into::into));
        self
    }

    /// Returns true if `name` matches a protected name.
    pub fn is_protected(&self, name: &str) -> bool {
        self.names.iter().any(|p| p.eq_ignore_ascii_case(name))
    }

    /// Strips protected names from both sets of a manifest.
    ///
    /// Names that are not a single plain path component (`..`, absolute
    /// paths, nested paths) are stripped too: a hand-edited manifest must
    /// never reach outside the install root.
    pub fn filter(&self, mut manifest: RequiredFiles) -> RequiredFiles {
        manifest.files.retain(|name| self.keep(name));
        manifest.directories.retain(|name| self.keep(name));
        manifest
    }

    fn keep(&self, name: &str) -> bool {
        if !is_plain_name(name) {
            tracing::warn!(name, "refusing to track a path that is not a top-level name");
            return false;
        }
        if self.is_protected(name) {
            tracing::warn!(name, "protected file/directory detected in list, skipping it");
            return false;
        }
        true
    }
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
