//! File operations behind a platform switch.
//!
//! Provides the protected-name policy, manifest computation for a platform
//! directory, and the install/delete primitives that move a manifest's
//! contents in and out of the install root.

mod delete;
mod install;
mod manifest;
mod protected;

use std::io;
use std::path::PathBuf;

pub use delete::delete_required_files;
pub use install::{copy_dir_recursive, ensure_dir, install_required_files, move_dir, restore_hidden_files};
pub use manifest::compute_required_files;
pub use protected::ProtectedSet;

/// Errors produced by filesystem operations.
#[derive(Debug, thiserror::Error)]
pub enum FileOpsError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {} -> {}: {}", .from.display(), .to.display(), .source)]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move {} -> {}: {}", .from.display(), .to.display(), .source)]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to delete {}: {}", .path.display(), .source)]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory {}: {}", .path.display(), .source)]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileOpsError {
    /// Returns the underlying I/O error.
    pub fn io_error(&self) -> &io::Error {
        match self {
            Self::Read { source, .. }
            | Self::Copy { source, .. }
            | Self::Move { source, .. }
            | Self::Delete { source, .. }
            | Self::CreateDir { source, .. } => source,
        }
    }

    /// Returns true if the failure looks like a file still held open by
    /// another process (typically the game right after it exits).
    pub fn is_in_use(&self) -> bool {
        let err = self.io_error();
        // 32 = ERROR_SHARING_VIOLATION, 33 = ERROR_LOCK_VIOLATION.
        err.kind() == io::ErrorKind::PermissionDenied
            || (cfg!(windows) && matches!(err.raw_os_error(), Some(32 | 33)))
    }
}
