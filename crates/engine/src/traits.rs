//! Collaborators the engine drives but does not implement.
//!
//! The binary wires real implementations from `platswap-launcher`; tests use
//! in-memory fakes.

use std::path::{Path, PathBuf};

use platswap_model::Entry;

/// What an activation sink is told after the last-ran entry changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// The entry that is now last-ran.
    pub entry: Entry,
    /// Save directory for the entry, including its label.
    pub save_dir: PathBuf,
    /// The game install root.
    pub root_dir: PathBuf,
}

/// Errors an activation sink may report. The engine logs them and carries on.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("activation sink unavailable: {0}")]
    Unavailable(String),
}

/// Mirrors the active entry into a system-level indicator (for example the
/// registry keys the game reads its save path from).
pub trait ActivationSink: Send + Sync {
    fn update(&self, activation: &Activation) -> Result<(), SinkError>;
}

/// Reports whether the managed game is currently running.
pub trait InstanceGuard: Send + Sync {
    fn is_running(&self) -> bool;
}

/// Errors from launching the external program.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to launch {}: {}", .path.display(), .source)]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {}: {}", .path.display(), .source)]
    Wait {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Starts the external program and blocks until it exits.
///
/// Called from a dedicated worker thread, never from the thread that
/// mutates state.
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, program: &Path, flags: &str, elevate: bool) -> Result<(), LaunchError>;
}
