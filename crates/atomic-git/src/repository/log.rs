use crate::{CommitInfo, Result};

use super::Repository;

impl Repository {
    /// Returns up to `limit` commits reachable from `HEAD`, newest first. An
    /// unborn `HEAD` yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be walked.
    pub fn recent_commits(&self, limit: usize) -> Result<Vec<CommitInfo>> {
        if self.head_commit().is_none() {
            return Ok(Vec::new());
        }

        let mut walk = self.inner.revwalk()?;
        walk.push_head()?;
        walk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in walk.take(limit) {
            let commit = self.inner.find_commit(oid?)?;
            commits.push(CommitInfo {
                sha: commit.id().to_string(),
                message: commit.message().unwrap_or_default().trim_end().to_string(),
            });
        }
        Ok(commits)
    }
}
