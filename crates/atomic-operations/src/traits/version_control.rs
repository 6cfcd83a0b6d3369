use std::path::Path;

use atomic_git::{CommitInfo, StatusEntry};

use crate::Result;

pub trait VersionControl: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the repository cannot be opened or status fails.
    fn status(&self, root: &Path) -> Result<Vec<StatusEntry>>;

    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    fn log(&self, root: &Path, limit: usize) -> Result<Vec<CommitInfo>>;

    /// Stashes every working-tree change except `keep`, which stays in the
    /// working tree. Returns `None` when there was nothing to stash.
    ///
    /// # Errors
    ///
    /// Returns an error if the stash cannot be created.
    fn stash_push(&self, root: &Path, keep: &[&Path]) -> Result<Option<String>>;

    /// Restores `paths` from the stash `stash` into the working tree and the
    /// index, then drops it.
    ///
    /// # Errors
    ///
    /// Returns an error if the stash cannot be found or restored.
    fn stash_pop(&self, root: &Path, stash: &str, paths: &[&Path]) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if staging any of the files fails.
    fn stage(&self, root: &Path, paths: &[&Path]) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the index cannot be reset for the given paths.
    fn unstage(&self, root: &Path, paths: &[&Path]) -> Result<()>;

    /// Commits the staged state of `paths` only.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit cannot be created.
    fn commit(&self, root: &Path, paths: &[&Path], message: &str) -> Result<CommitInfo>;
}
