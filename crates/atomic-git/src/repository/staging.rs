use std::path::Path;

use tracing::debug;

use crate::Result;

use super::Repository;

impl Repository {
    /// Stages the given paths. Paths that no longer exist in the working tree
    /// are removed from the index so deletions are staged too.
    ///
    /// # Errors
    ///
    /// Returns an error if staging any of the files fails.
    pub fn stage_files(&self, paths: &[&Path]) -> Result<()> {
        let mut index = self.inner.index()?;

        for path in paths {
            let relative_path = self.to_relative_path(path);

            if self.root().join(&relative_path).exists() {
                index.add_path(&relative_path)?;
            } else {
                index.remove_path(&relative_path)?;
            }
        }

        index.write()?;
        debug!(count = paths.len(), "staged paths");
        Ok(())
    }

    /// Resets the index entries of the given paths back to `HEAD`, leaving the
    /// working tree untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be updated.
    pub fn unstage_files(&self, paths: &[&Path]) -> Result<()> {
        let relative: Vec<_> = paths.iter().map(|p| self.to_relative_path(p)).collect();

        match self.head_commit() {
            Some(head) => {
                self.inner
                    .reset_default(Some(head.as_object()), relative.iter().map(|p| p.as_path()))?;
            }
            None => {
                let mut index = self.inner.index()?;
                for path in &relative {
                    index.remove_path(path)?;
                }
                index.write()?;
            }
        }

        debug!(count = paths.len(), "unstaged paths");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::Repository;
    use super::super::tests::{commit_file, setup_test_repo};
    use std::fs;
    use std::path::Path;

    fn has_staged_changes(repo: &Repository) -> anyhow::Result<bool> {
        let head_tree = repo.head_commit().map(|c| c.tree()).transpose()?;
        let index = repo.inner.index()?;
        let diff = repo
            .inner
            .diff_tree_to_index(head_tree.as_ref(), Some(&index), None)?;
        Ok(diff.deltas().next().is_some())
    }

    #[test]
    fn stage_single_file() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;

        fs::write(dir.path().join("file.txt"), "content")?;

        repo.stage_files(&[Path::new("file.txt")])?;

        let index = repo.inner.index()?;
        assert!(index.get_path(Path::new("file.txt"), 0).is_some());

        Ok(())
    }

    #[test]
    fn stage_deleted_file() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        commit_file(&dir, &repo, "file.txt", "content")?;

        fs::remove_file(dir.path().join("file.txt"))?;
        repo.stage_files(&[Path::new("file.txt")])?;

        let index = repo.inner.index()?;
        assert!(index.get_path(Path::new("file.txt"), 0).is_none());

        Ok(())
    }

    #[test]
    fn unstage_new_file_removes_it_from_index() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        fs::write(dir.path().join("file.txt"), "content")?;
        repo.stage_files(&[Path::new("file.txt")])?;

        repo.unstage_files(&[Path::new("file.txt")])?;

        let index = repo.inner.index()?;
        assert!(index.get_path(Path::new("file.txt"), 0).is_none());
        assert!(dir.path().join("file.txt").exists());
        assert!(!has_staged_changes(&repo)?);

        Ok(())
    }

    #[test]
    fn unstage_modified_file_keeps_worktree_content() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        commit_file(&dir, &repo, "file.txt", "one")?;
        fs::write(dir.path().join("file.txt"), "two")?;
        repo.stage_files(&[Path::new("file.txt")])?;
        assert!(has_staged_changes(&repo)?);

        repo.unstage_files(&[Path::new("file.txt")])?;

        assert!(!has_staged_changes(&repo)?);
        assert_eq!(fs::read_to_string(dir.path().join("file.txt"))?, "two");
        Ok(())
    }
}
