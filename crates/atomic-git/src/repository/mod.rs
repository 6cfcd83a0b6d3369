mod commit;
mod log;
mod staging;
mod stash;
mod status;

use std::path::{Path, PathBuf};

use crate::{GitError, Result};

pub struct Repository {
    pub(crate) inner: git2::Repository,
    root: PathBuf,
}

impl Repository {
    /// # Errors
    ///
    /// Returns [`GitError::NotARepository`] if the path is not inside a git repository
    /// or the repository is bare.
    pub fn open(path: &Path) -> Result<Self> {
        let inner = git2::Repository::discover(path).map_err(|_| GitError::NotARepository {
            path: path.to_path_buf(),
        })?;

        let root = inner.workdir().ok_or_else(|| GitError::NotARepository {
            path: path.to_path_buf(),
        })?;

        // Use dunce to get a path without the \\?\ prefix on Windows
        let root = dunce::simplified(root).to_path_buf();

        Ok(Self { inner, root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn to_relative_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            let normalized = dunce::simplified(path);
            normalized
                .strip_prefix(&self.root)
                .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
        } else {
            path.to_path_buf()
        }
    }

    pub(crate) fn head_commit(&self) -> Option<git2::Commit<'_>> {
        self.inner.head().ok().and_then(|h| h.peel_to_commit().ok())
    }
}
