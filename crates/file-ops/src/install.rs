//! Copying a platform's files into the install root.

use std::path::{Path, PathBuf};

use platswap_model::RequiredFiles;
use platswap_model::constants::BACKUP_SUFFIX;

use crate::{FileOpsError, ProtectedSet};

/// Copies every file and directory named in `manifest` from `platform_dir`
/// into `root_dir`, overwriting what is already there.
///
/// The manifest is filtered through `protected` first. Names missing from
/// the platform directory are skipped. Returns the number of top-level
/// items installed.
pub fn install_required_files(
    platform_dir: &Path,
    root_dir: &Path,
    manifest: &RequiredFiles,
    protected: &ProtectedSet,
) -> Result<usize, FileOpsError> {
    let manifest = protected.filter(manifest.clone());
    let mut installed = 0;

    for file in &manifest.files {
        let source = platform_dir.join(file);
        let target = root_dir.join(file);
        if source.is_file() {
            tracing::info!(from = %source.display(), to = %target.display(), "copying");
            copy_file(&source, &target)?;
            installed += 1;
        }
    }

    for dir in &manifest.directories {
        let source = platform_dir.join(dir);
        let target = root_dir.join(dir);
        if source.is_dir() {
            tracing::info!(from = %source.display(), to = %target.display(), "copying");
            copy_dir_recursive(&source, &target)?;
            installed += 1;
        }
    }

    Ok(installed)
}

/// Recursively copies `src` into `dst`, merging with and overwriting any
/// existing content.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), FileOpsError> {
    ensure_dir(dst)?;
    let read_err = |source| FileOpsError::Read {
        path: src.to_path_buf(),
        source,
    };

    for entry in std::fs::read_dir(src).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            copy_file(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

/// Creates `path` and its parents if they don't exist.
pub fn ensure_dir(path: &Path) -> Result<(), FileOpsError> {
    std::fs::create_dir_all(path).map_err(|source| FileOpsError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Renames a directory, creating the destination's parent when needed.
pub fn move_dir(from: &Path, to: &Path) -> Result<(), FileOpsError> {
    if let Some(parent) = to.parent() {
        ensure_dir(parent)?;
    }
    std::fs::rename(from, to).map_err(|source| FileOpsError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    tracing::info!(from = %from.display(), to = %to.display(), "moved directory");
    Ok(())
}

/// Moves `<name>.bak` back to `<name>` in `dir` for each name whose
/// original is absent. Returns the restored paths.
pub fn restore_hidden_files(dir: &Path, names: &[&str]) -> Result<Vec<PathBuf>, FileOpsError> {
    let mut restored = Vec::new();
    for name in names {
        let original = dir.join(name);
        let hidden = dir.join(format!("{name}{BACKUP_SUFFIX}"));
        if hidden.is_file() && !original.exists() {
            tracing::info!(from = %hidden.display(), to = %original.display(), "restoring hidden file");
            std::fs::rename(&hidden, &original).map_err(|source| FileOpsError::Move {
                from: hidden.clone(),
                to: original.clone(),
                source,
            })?;
            restored.push(original);
        }
    }
    Ok(restored)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), FileOpsError> {
    std::fs::copy(from, to)
        .map(|_| ())
        .map_err(|source| FileOpsError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn platform_with_content(root: &Path) -> PathBuf {
        let platform = root.join("Platforms").join("Classic107");
        fs::create_dir_all(platform.join("ExtraDir").join("nested")).unwrap();
        fs::write(platform.join("ExtraMod.mpq"), "mod").unwrap();
        fs::write(platform.join("d2char.mpq"), "platform-char").unwrap();
        fs::write(platform.join("ExtraDir").join("nested").join("a.txt"), "a").unwrap();
        platform
    }

    #[test]
    fn installs_files_and_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let platform = platform_with_content(root);
        let manifest = RequiredFiles::from_names(["ExtraMod.mpq"], ["ExtraDir"]);

        let installed =
            install_required_files(&platform, root, &manifest, &ProtectedSet::new()).unwrap();
        assert_eq!(installed, 2);
        assert_eq!(fs::read_to_string(root.join("ExtraMod.mpq")).unwrap(), "mod");
        assert!(root.join("ExtraDir").join("nested").join("a.txt").is_file());
    }

    #[test]
    fn never_overwrites_protected_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let platform = platform_with_content(root);
        fs::write(root.join("d2char.mpq"), "root-char").unwrap();

        // Manifest hand-edited to include a protected name.
        let manifest = RequiredFiles::from_names(["d2char.mpq"], Vec::<String>::new());
        let installed =
            install_required_files(&platform, root, &manifest, &ProtectedSet::new()).unwrap();
        assert_eq!(installed, 0);
        assert_eq!(fs::read_to_string(root.join("d2char.mpq")).unwrap(), "root-char");
    }

    #[test]
    fn overwrites_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let platform = platform_with_content(root);
        fs::write(root.join("ExtraMod.mpq"), "old").unwrap();
        fs::create_dir_all(root.join("ExtraDir").join("nested")).unwrap();
        fs::write(root.join("ExtraDir").join("nested").join("a.txt"), "old").unwrap();
        fs::write(root.join("ExtraDir").join("keep.txt"), "keep").unwrap();

        let manifest = RequiredFiles::from_names(["ExtraMod.mpq"], ["ExtraDir"]);
        install_required_files(&platform, root, &manifest, &ProtectedSet::new()).unwrap();
        assert_eq!(fs::read_to_string(root.join("ExtraMod.mpq")).unwrap(), "mod");
        assert_eq!(
            fs::read_to_string(root.join("ExtraDir").join("nested").join("a.txt")).unwrap(),
            "a"
        );
        assert!(root.join("ExtraDir").join("keep.txt").exists());
    }

    #[test]
    fn skips_names_missing_from_platform() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let platform = platform_with_content(root);
        let manifest = RequiredFiles::from_names(["Gone.dll"], ["GoneDir"]);
        let installed =
            install_required_files(&platform, root, &manifest, &ProtectedSet::new()).unwrap();
        assert_eq!(installed, 0);
        assert!(!root.join("Gone.dll").exists());
    }

    #[test]
    fn move_dir_creates_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let from = tmp.path().join("Saves").join("LOD");
        fs::create_dir_all(&from).unwrap();
        fs::write(from.join("hero.d2s"), "char").unwrap();
        let to = tmp.path().join("Other").join("Renamed");

        move_dir(&from, &to).unwrap();
        assert!(!from.exists());
        assert!(to.join("hero.d2s").is_file());
    }

    #[test]
    fn restore_hidden_files_only_when_original_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("d2exp.mpq.bak"), "hidden").unwrap();
        fs::write(dir.join("d2xtalk.mpq.bak"), "hidden").unwrap();
        fs::write(dir.join("d2xtalk.mpq"), "present").unwrap();

        let restored = restore_hidden_files(dir, &["d2exp.mpq", "d2xtalk.mpq", "d2xmusic.mpq"]).unwrap();
        assert_eq!(restored, vec![dir.join("d2exp.mpq")]);
        assert_eq!(fs::read_to_string(dir.join("d2exp.mpq")).unwrap(), "hidden");
        assert_eq!(fs::read_to_string(dir.join("d2xtalk.mpq")).unwrap(), "present");
        assert!(dir.join("d2xtalk.mpq.bak").exists());
    }

    #[test]
    fn ensure_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("Saves").join("LOD").join("Hardcore");
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
        // Existing directories are fine.
        ensure_dir(&dir).unwrap();
    }
}
