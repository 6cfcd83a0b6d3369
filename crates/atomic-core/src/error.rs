use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown status code '{code}' for '{path}'")]
    UnknownStatus { path: PathBuf, code: String },

    #[error("change entry has an empty path")]
    EmptyPath,

    #[error("unknown grouping mode '{0}' (expected auto, simple or complex)")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
