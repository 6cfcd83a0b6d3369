use thiserror::Error;

/// A file whose imports could not be extracted. Recoverable: the file is kept
/// as a leaf and the error becomes a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error at line {line}")]
    Syntax { line: usize },

    #[error("grammar unavailable: {0}")]
    Grammar(String),

    #[error("content is not valid UTF-8")]
    InvalidUtf8,

    #[error("content looks binary")]
    Binary,

    #[error("could not read file: {0}")]
    Unreadable(String),
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("failed to build analysis thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
