//! Where platswap keeps its state.
//!
//! `Entries.json`, `LastRequiredFiles.json` and `Settings.json` live in one
//! directory: `--state-dir`, then `PLATSWAP_STATE_DIR`, then the current
//! working directory.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Resolves the state directory from the CLI/env value, falling back to
/// `cwd`. Relative paths are taken relative to `cwd`.
pub fn resolve_state_dir(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    match explicit {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => cwd.join(dir),
        None => cwd.to_path_buf(),
    }
}

/// [`resolve_state_dir`] against the process working directory.
pub fn state_dir(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to read the current directory")?;
    Ok(resolve_state_dir(explicit, &cwd))
}
