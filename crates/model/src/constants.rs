/// Directory under the install root holding one subdirectory per platform.
pub const PLATFORMS_DIR: &str = "Platforms";

/// Directory under the install root holding per-platform save data.
pub const SAVES_DIR: &str = "Saves";

/// Save directory the game falls back to when the configured one is missing.
pub const LEGACY_SAVE_DIR: &str = "Save";

/// Default backups root name, relative to the install root.
pub const DEFAULT_BACKUPS_DIR: &str = "Backups";

/// Persisted entry list.
pub const ENTRIES_FILE: &str = "Entries.json";

/// Persisted manifest of the files installed by the last switch.
pub const LAST_REQUIRED_FILES_FILE: &str = "LastRequiredFiles.json";

/// Persisted settings.
pub const SETTINGS_FILE: &str = "Settings.json";

/// Suffix appended to a file's full name when it is backed up in place.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Core game archives that ship with every installation.
pub const CORE_ARCHIVES: &[&str] = &[
    "d2char.mpq",
    "d2data.mpq",
    "d2music.mpq",
    "d2sfx.mpq",
    "d2speech.mpq",
    "d2video.mpq",
];

/// Expansion archives. Older releases hid these as `<name>.bak`.
pub const EXPANSION_ARCHIVES: &[&str] = &["d2exp.mpq", "d2xmusic.mpq", "d2xvideo.mpq", "d2xtalk.mpq"];

/// Legacy language file.
pub const LEGACY_LANGUAGE_FILE: &str = "D2.LNG";

/// Returns the state files owned by platswap itself.
pub fn managed_files() -> [&'static str; 3] {
    [ENTRIES_FILE, LAST_REQUIRED_FILES_FILE, SETTINGS_FILE]
}
