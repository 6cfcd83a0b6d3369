use std::path::PathBuf;

use git2::Status;

use crate::{FileStatus, GitError, Result, StatusEntry};

use super::Repository;

impl Repository {
    /// Lists every changed path in the working tree, untracked files included.
    /// Staged renames are reported once with their `old_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the git status operation fails.
    pub fn status(&self) -> Result<Vec<StatusEntry>> {
        let statuses = self.inner.statuses(Some(
            git2::StatusOptions::new()
                .include_untracked(true)
                .recurse_untracked_dirs(true)
                .include_ignored(false)
                .renames_head_to_index(true),
        ))?;

        let mut entries = Vec::with_capacity(statuses.len());
        for entry in statuses.iter() {
            let flags = entry.status();
            if flags.is_ignored() {
                continue;
            }

            let index = index_status(flags);
            let worktree = worktree_status(flags);
            if index.is_none() && worktree.is_none() {
                continue;
            }

            let (path, old_path) = match entry.head_to_index() {
                Some(delta) if index == Some(FileStatus::Renamed) => {
                    let new = delta.new_file().path().map(PathBuf::from);
                    let old = delta.old_file().path().map(PathBuf::from);
                    (new, old)
                }
                _ => (entry.path().map(PathBuf::from), None),
            };

            entries.push(StatusEntry {
                path: path.ok_or(GitError::MissingStatusPath)?,
                old_path,
                index,
                worktree,
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    /// # Errors
    ///
    /// Returns an error if the git status operation fails.
    pub fn is_working_tree_clean(&self) -> Result<bool> {
        let statuses = self.inner.statuses(Some(
            git2::StatusOptions::new()
                .include_untracked(true)
                .recurse_untracked_dirs(true),
        ))?;

        Ok(statuses.is_empty())
    }
}

fn index_status(flags: Status) -> Option<FileStatus> {
    if flags.is_conflicted() {
        Some(FileStatus::Unmerged)
    } else if flags.is_index_new() {
        Some(FileStatus::Added)
    } else if flags.is_index_deleted() {
        Some(FileStatus::Deleted)
    } else if flags.is_index_renamed() {
        Some(FileStatus::Renamed)
    } else if flags.is_index_typechange() {
        Some(FileStatus::TypeChanged)
    } else if flags.is_index_modified() {
        Some(FileStatus::Modified)
    } else {
        None
    }
}

fn worktree_status(flags: Status) -> Option<FileStatus> {
    if flags.is_conflicted() {
        Some(FileStatus::Unmerged)
    } else if flags.is_wt_new() {
        Some(FileStatus::Untracked)
    } else if flags.is_wt_deleted() {
        Some(FileStatus::Deleted)
    } else if flags.is_wt_renamed() {
        Some(FileStatus::Renamed)
    } else if flags.is_wt_typechange() {
        Some(FileStatus::TypeChanged)
    } else if flags.is_wt_modified() {
        Some(FileStatus::Modified)
    } else {
        None
    }
}
