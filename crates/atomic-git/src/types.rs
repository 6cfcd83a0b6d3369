use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    TypeChanged,
    Unmerged,
    Untracked,
}

impl FileStatus {
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
            Self::TypeChanged => 'T',
            Self::Unmerged => 'U',
            Self::Untracked => '?',
        }
    }
}

/// One path reported by `git status`, split into its index and worktree
/// columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub path: PathBuf,
    pub old_path: Option<PathBuf>,
    pub index: Option<FileStatus>,
    pub worktree: Option<FileStatus>,
}

impl StatusEntry {
    /// Two-column porcelain code, e.g. `M `, ` D`, `AM` or `??`.
    #[must_use]
    pub fn porcelain_code(&self) -> String {
        if self.worktree == Some(FileStatus::Untracked) {
            return "??".to_string();
        }
        let x = self.index.map_or(' ', FileStatus::letter);
        let y = self.worktree.map_or(' ', FileStatus::letter);
        format!("{x}{y}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
}
