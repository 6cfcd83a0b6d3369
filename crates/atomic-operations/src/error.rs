use std::path::PathBuf;

use atomic_core::CommitResult;
use thiserror::Error;

use crate::operations::StashOutcome;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown analysis mode '{0}' (expected auto, simple or complex)")]
    UnknownMode(String),

    #[error("complexity threshold must be at least 1")]
    ZeroThreshold,

    #[error("analysis jobs must be at least 1")]
    ZeroJobs,

    #[error("invalid exclude pattern '{pattern}'")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("validate_each_commit is enabled but no validation commands are configured")]
    ValidationWithoutCommands,

    #[error("failed to read config file '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The grouped files still left once no group is free of unmet dependencies.
#[derive(Debug, Error)]
#[error("commit groups depend on each other in a cycle: {}", format_groups(groups))]
pub struct PlanningError {
    pub groups: Vec<Vec<PathBuf>>,
}

fn format_groups(groups: &[Vec<PathBuf>]) -> String {
    groups
        .iter()
        .map(|files| {
            let names: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
            format!("[{}]", names.join(", "))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Core(#[from] atomic_core::CoreError),

    #[error(transparent)]
    Git(#[from] atomic_git::GitError),

    #[error(transparent)]
    Analyzer(#[from] atomic_analyzer::AnalyzerError),

    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    #[error("failed to order commit groups")]
    Planning(#[from] PlanningError),

    #[error("failed to read '{path}'")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse command '{command}'")]
    InvalidCommand {
        command: String,
        #[source]
        source: shell_words::ParseError,
    },

    #[error("command is empty")]
    EmptyCommand,

    #[error("failed to run '{command}'")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "commit of group '{group}' failed after {} completed commit(s); the group was unstaged{}",
        completed.len(),
        stash_note(stash)
    )]
    CommitAborted {
        group: String,
        completed: Vec<CommitResult>,
        stash: StashOutcome,
        #[source]
        source: Box<OperationError>,
    },

    #[error("all groups were committed but stash '{stash}' could not be restored")]
    StashRestore {
        stash: String,
        completed: Vec<CommitResult>,
        #[source]
        source: Box<OperationError>,
    },
}

fn stash_note(stash: &StashOutcome) -> String {
    match stash {
        StashOutcome::Stashed { .. } | StashOutcome::Restored { .. } => format!("; {stash}"),
        _ => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, OperationError>;
