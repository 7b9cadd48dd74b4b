//! Removing a previously installed manifest from the install root.

use std::path::Path;

use platswap_model::RequiredFiles;

use crate::{FileOpsError, ProtectedSet};

/// Deletes every file and directory named in `manifest` from `root_dir`.
///
/// The manifest is filtered through `protected` first, so a hand-edited
/// state file can never cause a protected item to be removed. Names that
/// are already gone are skipped. Returns the number of items deleted.
pub fn delete_required_files(
    root_dir: &Path,
    manifest: &RequiredFiles,
    protected: &ProtectedSet,
) -> Result<usize, FileOpsError> {
    let manifest = protected.filter(manifest.clone());
    let mut deleted = 0;

    for file in &manifest.files {
        let target = root_dir.join(file);
        if target.is_file() {
            tracing::info!(path = %target.display(), "deleting");
            ignore_not_found(std::fs::remove_file(&target)).map_err(|source| {
                FileOpsError::Delete {
                    path: target.clone(),
                    source,
                }
            })?;
            deleted += 1;
        }
    }

    for dir in &manifest.directories {
        let target = root_dir.join(dir);
        if target.is_dir() {
            tracing::info!(path = %target.display(), "deleting directory");
            ignore_not_found(std::fs::remove_dir_all(&target)).map_err(|source| {
                FileOpsError::Delete {
                    path: target.clone(),
                    source,
                }
            })?;
            deleted += 1;
        }
    }

    Ok(deleted)
}

fn ignore_not_found(result: std::io::Result<()>) -> std::io::Result<()> {
    match result {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn deletes_files_and_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("ExtraMod.mpq"), "mod").unwrap();
        fs::create_dir_all(root.join("ExtraDir").join("deep")).unwrap();
        fs::write(root.join("ExtraDir").join("deep").join("x"), "x").unwrap();
        fs::write(root.join("Unrelated.txt"), "stay").unwrap();

        let manifest = RequiredFiles::from_names(["ExtraMod.mpq"], ["ExtraDir"]);
        let deleted = delete_required_files(root, &manifest, &ProtectedSet::new()).unwrap();
        assert_eq!(deleted, 2);
        assert!(!root.join("ExtraMod.mpq").exists());
        assert!(!root.join("ExtraDir").exists());
        assert!(root.join("Unrelated.txt").exists());
    }

    #[test]
    fn missing_items_are_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = RequiredFiles::from_names(["Gone.dll"], ["GoneDir"]);
        let deleted = delete_required_files(tmp.path(), &manifest, &ProtectedSet::new()).unwrap();
        assert_eq!(deleted, 0);
    }

    #[test]
    fn refuses_protected_names() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("d2data.mpq"), "core").unwrap();
        fs::create_dir(root.join("Saves")).unwrap();
        fs::create_dir(root.join("Platforms")).unwrap();

        let manifest = RequiredFiles::from_names(["D2DATA.MPQ"], ["saves", "Platforms"]);
        let deleted = delete_required_files(root, &manifest, &ProtectedSet::new()).unwrap();
        assert_eq!(deleted, 0);
        assert!(root.join("d2data.mpq").exists());
        assert!(root.join("Saves").is_dir());
        assert!(root.join("Platforms").is_dir());
    }

    #[test]
    fn file_entry_does_not_delete_same_named_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("Thing")).unwrap();

        let manifest = RequiredFiles::from_names(["Thing"], Vec::<String>::new());
        let deleted = delete_required_files(root, &manifest, &ProtectedSet::new()).unwrap();
        assert_eq!(deleted, 0);
        assert!(root.join("Thing").is_dir());
    }
}
