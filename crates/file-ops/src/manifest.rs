//! Manifest computation for a platform directory.

use std::path::Path;

use platswap_model::RequiredFiles;

use crate::{FileOpsError, ProtectedSet};

/// Lists the top-level files and directories of `platform_dir`.
///
/// A missing directory yields an empty manifest. Protected names are
/// stripped before returning.
pub fn compute_required_files(
    platform_dir: &Path,
    protected: &ProtectedSet,
) -> Result<RequiredFiles, FileOpsError> {
    if !platform_dir.is_dir() {
        return Ok(RequiredFiles::empty());
    }

    let read_err = |source| FileOpsError::Read {
        path: platform_dir.to_path_buf(),
        source,
    };

    let mut manifest = RequiredFiles::empty();
    for entry in std::fs::read_dir(platform_dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();

        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!(path = %path.display(), "skipping entry with a non UTF-8 name");
            continue;
        };

        if path.is_dir() {
            manifest.directories.insert(name);
        } else {
            manifest.files.insert(name);
        }
    }

    let manifest = protected.filter(manifest);
    tracing::debug!(
        dir = %platform_dir.display(),
        files = manifest.files.len(),
        directories = manifest.directories.len(),
        "computed required files"
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_dir_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest =
            compute_required_files(&tmp.path().join("Nope"), &ProtectedSet::new()).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn splits_files_and_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("Game.exe"), "exe").unwrap();
        fs::write(dir.join("Patch_D2.mpq"), "mpq").unwrap();
        fs::create_dir_all(dir.join("data").join("global")).unwrap();
        fs::write(dir.join("data").join("global").join("deep.txt"), "x").unwrap();

        let manifest = compute_required_files(dir, &ProtectedSet::new()).unwrap();
        assert_eq!(
            manifest,
            RequiredFiles::from_names(["Game.exe", "Patch_D2.mpq"], ["data"])
        );
    }

    #[test]
    fn never_contains_protected_names() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("d2char.mpq"), "core").unwrap();
        fs::write(dir.join("D2XTALK.MPQ"), "exp").unwrap();
        fs::write(dir.join("Entries.json"), "[]").unwrap();
        fs::create_dir(dir.join("Save")).unwrap();
        fs::create_dir(dir.join("saves")).unwrap();
        fs::write(dir.join("ExtraMod.mpq"), "mod").unwrap();

        let protected = ProtectedSet::new();
        let manifest = compute_required_files(dir, &protected).unwrap();
        assert!(manifest.files.iter().all(|n| !protected.is_protected(n)));
        assert!(manifest.directories.iter().all(|n| !protected.is_protected(n)));
        assert_eq!(manifest, RequiredFiles::from_names(["ExtraMod.mpq"], Vec::<String>::new()));
    }
}
