//! Per-run working repository
//!
//! A fresh staging directory holding the fetched metadata files and, after
//! restructuring, the verified `targets/` subtree. The directory is owned by
//! exactly one pipeline run and removed on drop, whatever the outcome.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("verified targets directory {0} does not exist")]
    MissingTargets(PathBuf),

    #[error("targets directory already present at {0}")]
    TargetsAlreadyPresent(PathBuf),
}

/// Local staging directory for one assembly run.
#[derive(Debug)]
pub struct WorkingRepository {
    dir: TempDir,
}

impl WorkingRepository {
    /// Create a fresh, empty working repository under the system temp dir.
    pub fn create() -> io::Result<Self> {
        let dir = TempDir::with_prefix("tuf-repository-")?;
        Ok(Self { dir })
    }

    /// Root of the staging tree.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Destination path for a metadata file staged at the repository root.
    pub fn metadata_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Relocate the trust store's verified targets directory into this
    /// repository as `targets/`.
    ///
    /// This is a single atomic rename, not a copy: `src` no longer exists
    /// afterwards. Fails if `src` is missing (initialization produced no
    /// targets) or if a `targets/` subtree is already staged.
    pub fn adopt_targets(&self, src: &Path) -> Result<(), RepoError> {
        if !src.exists() {
            return Err(RepoError::MissingTargets(src.to_path_buf()));
        }
        let dest = self.dir.path().join("targets");
        if dest.exists() {
            return Err(RepoError::TargetsAlreadyPresent(dest));
        }
        fs::rename(src, &dest)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_yields_empty_directory() {
        let repo = WorkingRepository::create().unwrap();
        assert!(repo.path().is_dir());
        assert_eq!(fs::read_dir(repo.path()).unwrap().count(), 0);
    }

    #[test]
    fn adopt_targets_moves_the_tree() {
        let repo = WorkingRepository::create().unwrap();
        let store = tempfile::tempdir().unwrap();
        let src = store.path().join("targets");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("fulcio.crt.pem"), b"cert").unwrap();

        repo.adopt_targets(&src).unwrap();

        assert!(!src.exists(), "source must not survive the move");
        let moved = repo.path().join("targets").join("fulcio.crt.pem");
        assert_eq!(fs::read(moved).unwrap(), b"cert");
    }

    #[test]
    fn adopt_targets_fails_without_source() {
        let repo = WorkingRepository::create().unwrap();
        let err = repo.adopt_targets(Path::new("/nonexistent/targets")).unwrap_err();
        assert!(matches!(err, RepoError::MissingTargets(_)));
    }

    #[test]
    fn adopt_targets_fails_when_destination_exists() {
        let repo = WorkingRepository::create().unwrap();
        fs::create_dir(repo.path().join("targets")).unwrap();

        let store = tempfile::tempdir().unwrap();
        let src = store.path().join("targets");
        fs::create_dir_all(&src).unwrap();

        let err = repo.adopt_targets(&src).unwrap_err();
        assert!(matches!(err, RepoError::TargetsAlreadyPresent(_)));
    }

    #[test]
    fn directory_is_removed_on_drop() {
        let path;
        {
            let repo = WorkingRepository::create().unwrap();
            path = repo.path().to_path_buf();
            fs::write(repo.metadata_path("timestamp.json"), b"{}").unwrap();
        }
        assert!(!path.exists());
    }
}
