use std::path::Path;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandRunner: Send + Sync {
    /// Runs one validation command in `root` and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be parsed or started. A command
    /// that runs and exits non-zero is not an error.
    fn run(&self, root: &Path, command: &str) -> Result<CommandOutput>;
}
