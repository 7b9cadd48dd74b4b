//! Error types for engine operations.

use std::path::PathBuf;

use platswap_file_ops::FileOpsError;
use platswap_store::StoreError;

/// Errors produced by switch, reset, entry and backup operations.
///
/// Every variant except `FileInUse`, `FileOps` and `Store` is raised before
/// anything on disk or in the entry list has changed.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("the game root directory is not set")]
    RootNotSet,

    #[error("the entry has no platform set")]
    EmptyPlatform,

    #[error("platform directory {} does not exist", .0.display())]
    PlatformMissing(PathBuf),

    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    #[error("an entry for {0} already exists")]
    DuplicateEntry(String),

    #[error("no entry at index {0}")]
    NoSuchEntry(usize),

    #[error("a platform directory named {} already exists", .0.display())]
    PlatformExists(PathBuf),

    #[error("a save directory already exists at {}", .0.display())]
    SaveDirExists(PathBuf),

    #[error("a label cannot be removed once created, only renamed")]
    LabelRemoval,

    #[error("the game is still running; close it before switching, resetting or backing up")]
    GameRunning,

    #[error("no entry was last ran, nothing to reset")]
    NothingToReset,

    #[error(
        "{0}\na file is still in use (switching too fast?); wait a few seconds after the game exits and try again"
    )]
    FileInUse(#[source] FileOpsError),

    #[error(transparent)]
    FileOps(FileOpsError),

    #[error("launcher {} does not exist", .0.display())]
    LauncherMissing(PathBuf),

    #[error("failed to start the launch thread: {0}")]
    LaunchThread(#[source] std::io::Error),

    #[error("{} is missing, cannot create a backup", .0.display())]
    BackupSourceMissing(PathBuf),

    #[error("backup directory {} already exists", .0.display())]
    BackupExists(PathBuf),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FileOpsError> for EngineError {
    fn from(err: FileOpsError) -> Self {
        if err.is_in_use() {
            Self::FileInUse(err)
        } else {
            Self::FileOps(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn permission_denied_maps_to_file_in_use() {
        let err = FileOpsError::Delete {
            path: PathBuf::from("Game.exe"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let err = EngineError::from(err);
        assert!(matches!(err, EngineError::FileInUse(_)));
        assert!(err.to_string().contains("try again"));
    }

    #[test]
    fn other_io_errors_stay_generic() {
        let err = FileOpsError::Read {
            path: PathBuf::from("Platforms"),
            source: io::Error::from(io::ErrorKind::InvalidData),
        };
        assert!(matches!(EngineError::from(err), EngineError::FileOps(_)));
    }
}
