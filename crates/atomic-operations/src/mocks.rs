use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use atomic_analyzer::ImportInfo;
use atomic_core::{ChangeEntry, FileChange};
use atomic_git::{CommitInfo, GitError, StatusEntry};
use atomic_graph::{DependencyGraph, NodeInput};

use crate::traits::{CommandOutput, CommandRunner, SourceReader, VersionControl};
use crate::{AnalysisConfig, OperationError, Result};

/// # Panics
///
/// Panics if `code` is not a recognized status code.
#[must_use]
pub fn change(path: &str, code: &str) -> FileChange {
    FileChange::from_entry(
        &ChangeEntry::new(path, code),
        &AnalysisConfig::default().package_roots,
    )
    .expect("valid change entry")
}

/// Builds a graph over `changes` where each `(importer, imported)` pair is a
/// relative import that resolves to `imported`.
#[must_use]
pub fn graph_for(changes: &[FileChange], imports: &[(&str, &str)]) -> DependencyGraph {
    let inputs = changes
        .iter()
        .map(|c| NodeInput {
            path: c.path.clone(),
            kind: c.kind,
            imports: imports
                .iter()
                .filter(|(importer, _)| Path::new(importer) == c.path)
                .map(|(_, imported)| {
                    ImportInfo::relative(*imported, false, vec![PathBuf::from(imported)])
                })
                .collect(),
            exports: Vec::new(),
            api_surface_changes: c.affects_public_api,
        })
        .collect();
    atomic_graph::build(inputs)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Status,
    Log,
    /// Paths kept in the working tree.
    StashPush(Vec<PathBuf>),
    /// Paths restored from the stash.
    StashPop(Vec<PathBuf>),
    Stage(Vec<PathBuf>),
    Unstage(Vec<PathBuf>),
    Commit(String),
}

pub struct MockVersionControl {
    status: Vec<StatusEntry>,
    history: Vec<CommitInfo>,
    fail_stage_at: Option<usize>,
    fail_commit_at: Option<usize>,
    fail_stash_pop: bool,
    calls: Mutex<Vec<VcsCall>>,
}

impl MockVersionControl {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: Vec::new(),
            history: vec![CommitInfo {
                sha: "base000".to_string(),
                message: "initial".to_string(),
            }],
            fail_stage_at: None,
            fail_commit_at: None,
            fail_stash_pop: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_status(mut self, entries: Vec<StatusEntry>) -> Self {
        self.status = entries;
        self
    }

    #[must_use]
    pub fn with_empty_history(mut self) -> Self {
        self.history.clear();
        self
    }

    /// Fails the `n`th stage call, counting from 1.
    #[must_use]
    pub fn failing_stage_at(mut self, n: usize) -> Self {
        self.fail_stage_at = Some(n);
        self
    }

    /// Fails the `n`th commit call, counting from 1.
    #[must_use]
    pub fn failing_commit_at(mut self, n: usize) -> Self {
        self.fail_commit_at = Some(n);
        self
    }

    #[must_use]
    pub fn failing_stash_pop(mut self) -> Self {
        self.fail_stash_pop = true;
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn commits(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                VcsCall::Commit(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: VcsCall) -> usize {
        let mut calls = self.calls.lock().expect("lock poisoned");
        let discriminant = std::mem::discriminant(&call);
        calls.push(call);
        calls
            .iter()
            .filter(|c| std::mem::discriminant(*c) == discriminant)
            .count()
    }
}

impl Default for MockVersionControl {
    fn default() -> Self {
        Self::new()
    }
}

fn owned(paths: &[&Path]) -> Vec<PathBuf> {
    paths.iter().map(|p| p.to_path_buf()).collect()
}

fn injected_failure() -> OperationError {
    OperationError::Git(GitError::Git(git2::Error::from_str("injected failure")))
}

impl VersionControl for MockVersionControl {
    fn status(&self, _root: &Path) -> Result<Vec<StatusEntry>> {
        self.record(VcsCall::Status);
        Ok(self.status.clone())
    }

    fn log(&self, _root: &Path, limit: usize) -> Result<Vec<CommitInfo>> {
        self.record(VcsCall::Log);
        Ok(self.history.iter().take(limit).cloned().collect())
    }

    fn stash_push(&self, _root: &Path, keep: &[&Path]) -> Result<Option<String>> {
        self.record(VcsCall::StashPush(owned(keep)));
        Ok(Some("stash000".to_string()))
    }

    fn stash_pop(&self, _root: &Path, stash: &str, paths: &[&Path]) -> Result<()> {
        self.record(VcsCall::StashPop(owned(paths)));
        if self.fail_stash_pop {
            return Err(OperationError::Git(GitError::UnknownStash(stash.to_string())));
        }
        Ok(())
    }

    fn stage(&self, _root: &Path, paths: &[&Path]) -> Result<()> {
        let n = self.record(VcsCall::Stage(owned(paths)));
        if self.fail_stage_at == Some(n) {
            return Err(injected_failure());
        }
        Ok(())
    }

    fn unstage(&self, _root: &Path, paths: &[&Path]) -> Result<()> {
        self.record(VcsCall::Unstage(owned(paths)));
        Ok(())
    }

    fn commit(&self, _root: &Path, _paths: &[&Path], message: &str) -> Result<CommitInfo> {
        let n = self.record(VcsCall::Commit(message.to_string()));
        if self.fail_commit_at == Some(n) {
            return Err(injected_failure());
        }
        Ok(CommitInfo {
            sha: format!("sha{n:03}"),
            message: message.to_string(),
        })
    }
}

impl VersionControl for Arc<MockVersionControl> {
    fn status(&self, root: &Path) -> Result<Vec<StatusEntry>> {
        (**self).status(root)
    }

    fn log(&self, root: &Path, limit: usize) -> Result<Vec<CommitInfo>> {
        (**self).log(root, limit)
    }

    fn stash_push(&self, root: &Path, keep: &[&Path]) -> Result<Option<String>> {
        (**self).stash_push(root, keep)
    }

    fn stash_pop(&self, root: &Path, stash: &str, paths: &[&Path]) -> Result<()> {
        (**self).stash_pop(root, stash, paths)
    }

    fn stage(&self, root: &Path, paths: &[&Path]) -> Result<()> {
        (**self).stage(root, paths)
    }

    fn unstage(&self, root: &Path, paths: &[&Path]) -> Result<()> {
        (**self).unstage(root, paths)
    }

    fn commit(&self, root: &Path, paths: &[&Path], message: &str) -> Result<CommitInfo> {
        (**self).commit(root, paths, message)
    }
}

pub struct MockCommandRunner {
    fail_at: Option<usize>,
    commands: Mutex<Vec<String>>,
}

impl MockCommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fail_at: None,
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Makes the `n`th command, counting from 1, exit with status 1.
    #[must_use]
    pub fn failing_at(mut self, n: usize) -> Self {
        self.fail_at = Some(n);
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("lock poisoned").clone()
    }
}

impl Default for MockCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, _root: &Path, command: &str) -> Result<CommandOutput> {
        let mut commands = self.commands.lock().expect("lock poisoned");
        commands.push(command.to_string());
        let failed = self.fail_at == Some(commands.len());
        Ok(CommandOutput {
            success: !failed,
            exit_code: Some(i32::from(failed)),
            stdout: String::new(),
            stderr: if failed { format!("{command} failed") } else { String::new() },
        })
    }
}

impl CommandRunner for Arc<MockCommandRunner> {
    fn run(&self, root: &Path, command: &str) -> Result<CommandOutput> {
        (**self).run(root, command)
    }
}

pub struct MockSourceReader {
    files: HashMap<PathBuf, Vec<u8>>,
    reads: Mutex<Vec<PathBuf>>,
}

impl MockSourceReader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            reads: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(PathBuf::from(path), content.into());
        self
    }

    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().expect("lock poisoned").clone()
    }
}

impl Default for MockSourceReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceReader for MockSourceReader {
    fn read(&self, _root: &Path, path: &Path) -> Result<Vec<u8>> {
        self.reads.lock().expect("lock poisoned").push(path.to_path_buf());
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| OperationError::SourceRead {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}

impl SourceReader for Arc<MockSourceReader> {
    fn read(&self, root: &Path, path: &Path) -> Result<Vec<u8>> {
        (**self).read(root, path)
    }
}
