use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to determine current directory")]
    CurrentDir(#[source] std::io::Error),

    #[error("could not open git repository")]
    Git(#[from] atomic_git::GitError),

    #[error("invalid configuration")]
    Config(#[from] atomic_operations::ConfigError),

    #[error(transparent)]
    Operation(#[from] atomic_operations::OperationError),

    #[error("failed to serialize output")]
    Json(#[from] serde_json::Error),

    #[error("validation command '{command}' failed for group '{group}'")]
    ValidationHalted { group: String, command: String },
}

pub type Result<T> = std::result::Result<T, CliError>;
