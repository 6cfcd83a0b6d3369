use std::path::Path;

use atomic_git::{CommitInfo, Repository, StatusEntry};

use crate::Result;
use crate::traits::VersionControl;

pub struct Git2VersionControl;

impl Git2VersionControl {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Git2VersionControl {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionControl for Git2VersionControl {
    fn status(&self, root: &Path) -> Result<Vec<StatusEntry>> {
        let repo = Repository::open(root)?;
        Ok(repo.status()?)
    }

    fn log(&self, root: &Path, limit: usize) -> Result<Vec<CommitInfo>> {
        let repo = Repository::open(root)?;
        Ok(repo.recent_commits(limit)?)
    }

    fn stash_push(&self, root: &Path, keep: &[&Path]) -> Result<Option<String>> {
        let mut repo = Repository::open(root)?;
        Ok(repo.stash_except(keep)?)
    }

    fn stash_pop(&self, root: &Path, stash: &str, paths: &[&Path]) -> Result<()> {
        let mut repo = Repository::open(root)?;
        Ok(repo.restore_stash(stash, paths)?)
    }

    fn stage(&self, root: &Path, paths: &[&Path]) -> Result<()> {
        let repo = Repository::open(root)?;
        Ok(repo.stage_files(paths)?)
    }

    fn unstage(&self, root: &Path, paths: &[&Path]) -> Result<()> {
        let repo = Repository::open(root)?;
        Ok(repo.unstage_files(paths)?)
    }

    fn commit(&self, root: &Path, paths: &[&Path], message: &str) -> Result<CommitInfo> {
        let repo = Repository::open(root)?;
        Ok(repo.commit(paths, message)?)
    }
}
