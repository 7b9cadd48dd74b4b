use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// One switchable configuration: a platform, an optional save label and
/// the launcher used to start it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Entry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub platform: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub launcher: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flags: String,
    #[serde(default)]
    pub was_last_ran: bool,
}

impl Entry {
    /// Creates an entry that has never been run. Blank labels become `None`.
    pub fn new(
        platform: impl Into<String>,
        label: Option<&str>,
        launcher: impl Into<String>,
        flags: impl Into<String>,
    ) -> Self {
        Self {
            platform: platform.into(),
            label: normalize_label(label.map(str::to_string)),
            launcher: launcher.into(),
            flags: flags.into(),
            was_last_ran: false,
        }
    }

    /// Case-insensitive platform comparison.
    pub fn same_platform(&self, other: &Entry) -> bool {
        self.platform.eq_ignore_ascii_case(&other.platform)
    }

    /// Case-insensitive label comparison; two missing labels are equal.
    pub fn same_label(&self, other: &Entry) -> bool {
        labels_equal(self.label.as_deref(), other.label.as_deref())
    }

    /// Returns true if this entry targets the given platform and label.
    pub fn is(&self, platform: &str, label: Option<&str>) -> bool {
        self.platform.eq_ignore_ascii_case(platform) && labels_equal(self.label.as_deref(), label)
    }

    /// Explains why the entry cannot be stored, if it can't.
    ///
    /// Platform and launcher are required; label and flags are optional.
    /// Platform, launcher and label must be valid file names, and none may
    /// be `.` or `..`: each is joined onto the root.
    pub fn invalid_reason(&self) -> Option<String> {
        if self.platform.trim().is_empty() {
            return Some("platform is required".into());
        }
        if self.launcher.trim().is_empty() {
            return Some("launcher is required".into());
        }
        let named = [
            ("platform", Some(self.platform.as_str())),
            ("launcher", Some(self.launcher.as_str())),
            ("label", self.label.as_deref()),
        ];
        for (field, value) in named {
            if let Some(value) = value {
                if contains_invalid_characters(value) {
                    return Some(format!("{field} \"{value}\" contains invalid characters"));
                }
                if matches!(value.trim(), "." | "..") {
                    return Some(format!("{field} \"{value}\" is not a valid name"));
                }
            }
        }
        None
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} [{}]", self.platform, label),
            None => write!(f, "{}", self.platform),
        }
    }
}

/// Turns empty or whitespace-only labels into `None`.
pub fn normalize_label(label: Option<String>) -> Option<String> {
    label.filter(|l| !l.trim().is_empty())
}

fn labels_equal(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// Returns true if `word` contains a character that is not allowed in a
/// Windows file name.
pub fn contains_invalid_characters(word: &str) -> bool {
    word.chars()
        .any(|c| c.is_ascii_control() || matches!(c, '"' | '<' | '>' | '|' | ':' | '*' | '?' | '\\' | '/'))
}

/// Top-level files and directories a platform installs into the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequiredFiles {
    #[serde(default, deserialize_with = "null_as_default")]
    pub directories: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: BTreeSet<String>,
}

impl RequiredFiles {
    /// Returns a manifest with no files and no directories.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a manifest from file and directory names.
    pub fn from_names<F, D>(files: F, directories: D) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            directories: directories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }

    /// Total number of names tracked.
    pub fn len(&self) -> usize {
        self.files.len() + self.directories.len()
    }
}

/// Persisted application settings.
///
/// Only the root and backups directories matter to the engine; the UI
/// preferences are carried so that saving never drops them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(deserialize_with = "null_as_default")]
    pub root_directory: String,
    #[serde(deserialize_with = "null_as_default")]
    pub backups_directory: String,
    pub should_minimize_to_tray: bool,
    pub should_enable_dark_mode: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub preferred_color: String,
    pub has_migrated_to_new_format: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_directory: String::new(),
            backups_directory: String::new(),
            should_minimize_to_tray: false,
            should_enable_dark_mode: false,
            preferred_color: "Teal".into(),
            has_migrated_to_new_format: false,
        }
    }
}

impl Settings {
    /// Returns the install root, or `None` if it was never configured.
    pub fn root_dir(&self) -> Option<PathBuf> {
        let root = self.root_directory.trim();
        if root.is_empty() {
            None
        } else {
            Some(PathBuf::from(root))
        }
    }

    /// Returns the configured backups root, if any.
    pub fn backups_dir(&self) -> Option<PathBuf> {
        let dir = self.backups_directory.trim();
        if dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(dir))
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(normalize_label(Option::<String>::deserialize(deserializer)?))
}
