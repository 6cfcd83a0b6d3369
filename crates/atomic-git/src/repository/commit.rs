use std::path::Path;

use git2::FileMode;
use git2::build::TreeUpdateBuilder;
use tracing::info;

use crate::{CommitInfo, GitError, Result};

use super::Repository;

impl Repository {
    /// Commits the staged state of `paths` on top of `HEAD`. Index entries for
    /// any other path are left out of the commit and stay staged.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NothingToCommit`] if the paths are staged exactly as
    /// in `HEAD`, or an error if the commit cannot be created.
    pub fn commit(&self, paths: &[&Path], message: &str) -> Result<CommitInfo> {
        let parent = self.head_commit();
        let base_tree = match &parent {
            Some(commit) => commit.tree()?,
            None => {
                let empty = self.inner.treebuilder(None)?.write()?;
                self.inner.find_tree(empty)?
            }
        };

        let index = self.inner.index()?;
        let mut updates = TreeUpdateBuilder::new();
        for path in paths {
            let relative = self.to_relative_path(path);
            match index.get_path(&relative, 0) {
                Some(entry) => {
                    updates.upsert(relative.as_path(), entry.id, file_mode(entry.mode));
                }
                None if base_tree.get_path(&relative).is_ok() => {
                    updates.remove(relative.as_path());
                }
                None => {}
            }
        }

        let tree_id = updates.create_updated(&self.inner, &base_tree)?;
        if tree_id == base_tree.id() {
            return Err(GitError::NothingToCommit);
        }
        let tree = self.inner.find_tree(tree_id)?;

        let sig = self.inner.signature()?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let commit_oid = self
            .inner
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;

        let sha = commit_oid.to_string();
        info!(sha = %sha, files = paths.len(), "created commit");

        Ok(CommitInfo {
            sha,
            message: message.to_string(),
        })
    }
}

fn file_mode(raw: u32) -> FileMode {
    match raw {
        0o100_755 => FileMode::BlobExecutable,
        0o120_000 => FileMode::Link,
        0o160_000 => FileMode::Commit,
        _ => FileMode::Blob,
    }
}
