use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git operation failed")]
    Git(#[from] git2::Error),

    #[error("not a git repository: '{path}'")]
    NotARepository { path: PathBuf },

    #[error("status entry has no usable path")]
    MissingStatusPath,

    #[error("nothing staged to commit")]
    NothingToCommit,

    #[error("stash '{0}' is not in the stash list")]
    UnknownStash(String),

    #[error("failed to write '{path}' to the working tree")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
