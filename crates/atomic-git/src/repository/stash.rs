use std::fs;
use std::path::Path;

use git2::{ErrorCode, Index, IndexEntry, IndexTime, Oid, StashFlags, Tree, TreeEntry};
use tracing::debug;

use crate::{GitError, Result};

use super::Repository;

const STASH_MESSAGE: &str = "atomic-commit: unrelated changes";
const MODE_EXECUTABLE: i32 = 0o100_755;
const MODE_LINK: i32 = 0o120_000;

/// Trees recorded by a stash commit: the working tree of tracked files, the
/// index, and untracked files when there were any.
struct StashSnapshot<'r> {
    worktree: Tree<'r>,
    index: Tree<'r>,
    untracked: Option<Tree<'r>>,
}

impl<'r> StashSnapshot<'r> {
    fn load(repo: &'r git2::Repository, oid: Oid) -> Result<Self> {
        let commit = repo.find_commit(oid)?;
        Ok(Self {
            worktree: commit.tree()?,
            index: commit.parent(1)?.tree()?,
            untracked: commit.parent(2).ok().map(|c| c.tree()).transpose()?,
        })
    }

    fn worktree_entry(&self, path: &Path) -> Option<TreeEntry<'static>> {
        self.untracked
            .as_ref()
            .and_then(|tree| tree.get_path(path).ok())
            .or_else(|| self.worktree.get_path(path).ok())
    }
}

impl Repository {
    /// Stashes every change, untracked files included, then writes `keep`
    /// back into the working tree from the stash. The index is left at
    /// `HEAD`. Returns the stash commit id, or `None` when the working tree
    /// was clean.
    ///
    /// # Errors
    ///
    /// Returns an error if the stash cannot be created or a kept path cannot
    /// be written back.
    pub fn stash_except(&mut self, keep: &[&Path]) -> Result<Option<String>> {
        let signature = self.inner.signature()?;
        let oid = match self.inner.stash_save(
            &signature,
            STASH_MESSAGE,
            Some(StashFlags::INCLUDE_UNTRACKED),
        ) {
            Ok(oid) => oid,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot = StashSnapshot::load(&self.inner, oid)?;
        for path in keep {
            let relative = self.to_relative_path(path);
            self.restore_worktree_path(&snapshot, &relative)?;
        }

        debug!(stash = %oid, kept = keep.len(), "stashed changes");
        Ok(Some(oid.to_string()))
    }

    /// Writes `paths` back from the stash into the working tree and the index,
    /// then drops the stash entry.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::UnknownStash`] if `stash` is not in the stash list,
    /// or an error if a path cannot be restored.
    pub fn restore_stash(&mut self, stash: &str, paths: &[&Path]) -> Result<()> {
        let unknown = || GitError::UnknownStash(stash.to_string());
        let oid = Oid::from_str(stash).map_err(|_| unknown())?;
        let position = self.stash_position(oid)?.ok_or_else(unknown)?;

        {
            let snapshot = StashSnapshot::load(&self.inner, oid)?;
            let mut index = self.inner.index()?;
            for path in paths {
                let relative = self.to_relative_path(path);
                self.restore_worktree_path(&snapshot, &relative)?;
                restore_index_path(&mut index, &snapshot, &relative)?;
            }
            index.write()?;
        }

        self.inner.stash_drop(position)?;
        debug!(stash = %oid, restored = paths.len(), "restored stash");
        Ok(())
    }

    fn stash_position(&mut self, oid: Oid) -> Result<Option<usize>> {
        let mut position = None;
        self.inner.stash_foreach(|index, _message, id| {
            if *id == oid {
                position = Some(index);
                false
            } else {
                true
            }
        })?;
        Ok(position)
    }

    fn restore_worktree_path(&self, snapshot: &StashSnapshot<'_>, relative: &Path) -> Result<()> {
        let target = self.root().join(relative);
        match snapshot.worktree_entry(relative) {
            Some(entry) => {
                let blob = self.inner.find_blob(entry.id())?;
                write_file(&target, blob.content(), entry.filemode())
            }
            None => remove_file(&target),
        }
    }
}

fn restore_index_path(index: &mut Index, snapshot: &StashSnapshot<'_>, relative: &Path) -> Result<()> {
    match snapshot.index.get_path(relative) {
        Ok(entry) => index.add(&index_entry(relative, &entry))?,
        Err(_) => index.remove_path(relative)?,
    }
    Ok(())
}

fn index_entry(relative: &Path, entry: &TreeEntry<'_>) -> IndexEntry {
    IndexEntry {
        ctime: IndexTime::new(0, 0),
        mtime: IndexTime::new(0, 0),
        dev: 0,
        ino: 0,
        mode: u32::try_from(entry.filemode()).unwrap_or(0o100_644),
        uid: 0,
        gid: 0,
        file_size: 0,
        id: entry.id(),
        flags: 0,
        flags_extended: 0,
        path: relative.to_string_lossy().replace('\\', "/").into_bytes(),
    }
}

#[cfg_attr(not(unix), allow(unused_variables))]
fn write_file(target: &Path, content: &[u8], mode: i32) -> Result<()> {
    let io = |source| GitError::Io {
        path: target.to_path_buf(),
        source,
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(io)?;
    }
    if fs::symlink_metadata(target).is_ok_and(|m| m.file_type().is_symlink()) {
        fs::remove_file(target).map_err(io)?;
    }

    #[cfg(unix)]
    if mode == MODE_LINK {
        use std::os::unix::ffi::OsStrExt;
        let link = Path::new(std::ffi::OsStr::from_bytes(content));
        return std::os::unix::fs::symlink(link, target).map_err(io);
    }

    fs::write(target, content).map_err(io)?;

    #[cfg(unix)]
    if mode == MODE_EXECUTABLE {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(target, fs::Permissions::from_mode(0o755)).map_err(io)?;
    }
    Ok(())
}

fn remove_file(target: &Path) -> Result<()> {
    match fs::remove_file(target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(GitError::Io {
            path: target.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::super::Repository;
    use super::super::tests::{commit_file, setup_test_repo};
    use crate::GitError;
    use std::fs;
    use std::path::Path;

    fn stash_count(repo: &mut Repository) -> anyhow::Result<usize> {
        let mut count = 0;
        repo.inner.stash_foreach(|_, _, _| {
            count += 1;
            true
        })?;
        Ok(count)
    }

    #[test]
    fn kept_paths_stay_while_others_are_stashed() -> anyhow::Result<()> {
        let (dir, mut repo) = setup_test_repo()?;
        commit_file(&dir, &repo, "keep.txt", "keep")?;
        commit_file(&dir, &repo, "hide.txt", "hide")?;
        commit_file(&dir, &repo, "gone.txt", "gone")?;

        fs::write(dir.path().join("keep.txt"), "keep changed")?;
        fs::write(dir.path().join("hide.txt"), "hide changed")?;
        fs::remove_file(dir.path().join("gone.txt"))?;
        fs::create_dir_all(dir.path().join("src"))?;
        fs::write(dir.path().join("src/new.txt"), "new")?;
        fs::write(dir.path().join("extra.txt"), "untracked")?;

        let stash = repo.stash_except(&[
            Path::new("keep.txt"),
            Path::new("gone.txt"),
            Path::new("src/new.txt"),
        ])?;

        assert!(stash.is_some());
        assert_eq!(
            fs::read_to_string(dir.path().join("keep.txt"))?,
            "keep changed"
        );
        assert!(!dir.path().join("gone.txt").exists());
        assert_eq!(fs::read_to_string(dir.path().join("src/new.txt"))?, "new");
        assert_eq!(fs::read_to_string(dir.path().join("hide.txt"))?, "hide");
        assert!(!dir.path().join("extra.txt").exists());
        Ok(())
    }

    #[test]
    fn restore_brings_back_stashed_paths_and_drops_the_entry() -> anyhow::Result<()> {
        let (dir, mut repo) = setup_test_repo()?;
        commit_file(&dir, &repo, "keep.txt", "keep")?;
        commit_file(&dir, &repo, "hide.txt", "hide")?;
        fs::write(dir.path().join("keep.txt"), "keep changed")?;
        fs::write(dir.path().join("hide.txt"), "hide changed")?;
        fs::write(dir.path().join("extra.txt"), "untracked")?;

        let stash = repo
            .stash_except(&[Path::new("keep.txt")])?
            .ok_or_else(|| anyhow::anyhow!("nothing stashed"))?;
        repo.restore_stash(&stash, &[Path::new("hide.txt"), Path::new("extra.txt")])?;

        assert_eq!(
            fs::read_to_string(dir.path().join("hide.txt"))?,
            "hide changed"
        );
        assert_eq!(fs::read_to_string(dir.path().join("extra.txt"))?, "untracked");
        assert_eq!(
            fs::read_to_string(dir.path().join("keep.txt"))?,
            "keep changed"
        );
        assert_eq!(stash_count(&mut repo)?, 0);
        Ok(())
    }

    #[test]
    fn restore_keeps_staged_state_of_stashed_paths() -> anyhow::Result<()> {
        let (dir, mut repo) = setup_test_repo()?;
        commit_file(&dir, &repo, "hide.txt", "hide")?;
        fs::write(dir.path().join("hide.txt"), "hide staged")?;
        repo.stage_files(&[Path::new("hide.txt")])?;
        fs::write(dir.path().join("hide.txt"), "hide worktree")?;

        let stash = repo
            .stash_except(&[])?
            .ok_or_else(|| anyhow::anyhow!("nothing stashed"))?;
        repo.restore_stash(&stash, &[Path::new("hide.txt")])?;

        assert_eq!(
            fs::read_to_string(dir.path().join("hide.txt"))?,
            "hide worktree"
        );
        let index = repo.inner.index()?;
        let entry = index
            .get_path(Path::new("hide.txt"), 0)
            .ok_or_else(|| anyhow::anyhow!("hide.txt not in index"))?;
        assert_eq!(repo.inner.find_blob(entry.id)?.content(), b"hide staged");
        Ok(())
    }

    #[test]
    fn clean_tree_has_nothing_to_stash() -> anyhow::Result<()> {
        let (_dir, mut repo) = setup_test_repo()?;
        assert_eq!(repo.stash_except(&[])?, None);
        Ok(())
    }

    #[test]
    fn restoring_unknown_stash_fails() -> anyhow::Result<()> {
        let (_dir, mut repo) = setup_test_repo()?;
        let result = repo.restore_stash("0123456789012345678901234567890123456789", &[]);
        assert!(matches!(result, Err(GitError::UnknownStash(_))));
        Ok(())
    }
}
