use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::traits::{CommandOutput, CommandRunner};
use crate::{OperationError, Result};

/// Splits a command line with shell quoting rules and runs it directly,
/// without a shell, in the repository root.
pub struct ShellCommandRunner;

impl ShellCommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ShellCommandRunner {
    fn run(&self, root: &Path, command: &str) -> Result<CommandOutput> {
        let words = shell_words::split(command).map_err(|source| OperationError::InvalidCommand {
            command: command.to_string(),
            source,
        })?;
        let (program, args) = words.split_first().ok_or(OperationError::EmptyCommand)?;

        debug!(command, root = %root.display(), "running validation command");

        let output = Command::new(program)
            .args(args)
            .current_dir(root)
            .output()
            .map_err(|source| OperationError::CommandSpawn {
                command: command.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
