use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use atomic_core::{AnalysisResult, AtomicCommitGroup, CommitResult};
use atomic_git::CommitInfo;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::message::commit_message;
use crate::traits::{CommandRunner, VersionControl};
use crate::{CommitConfig, OperationError, Result};

/// What happened to working-tree changes outside the planned files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum StashOutcome {
    Disabled,
    /// Dry runs never touch the stash.
    Skipped,
    NothingToStash,
    /// Still stashed: restoring failed after a halted run.
    Stashed { id: String },
    Restored { id: String },
}

impl fmt::Display for StashOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("stash disabled"),
            Self::Skipped => f.write_str("stash skipped"),
            Self::NothingToStash => f.write_str("nothing to stash"),
            Self::Stashed { id } => write!(f, "unrelated changes are still stashed in {id}"),
            Self::Restored { id } => write!(f, "unrelated changes restored from stash {id}"),
        }
    }
}

/// A validation command that stopped the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub group: String,
    pub command: String,
    /// `None` when the command could not be started or was killed.
    pub exit_code: Option<i32>,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    pub results: Vec<CommitResult>,
    pub base_commit: Option<String>,
    pub stash: StashOutcome,
    pub halted: Option<ValidationFailure>,
    pub dry_run: bool,
}

impl CommitReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.halted.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupState {
    Pending,
    Staging,
    Committing,
    Validating,
    Committed,
    Failed,
    RolledBack,
}

struct GroupRun<'a> {
    id: &'a str,
    state: GroupState,
}

impl<'a> GroupRun<'a> {
    fn new(id: &'a str) -> Self {
        Self {
            id,
            state: GroupState::Pending,
        }
    }

    fn advance(&mut self, next: GroupState) {
        debug!(group = self.id, from = ?self.state, to = ?next, "group state changed");
        self.state = next;
    }
}

pub struct CommitOperation<V, C> {
    vcs: V,
    runner: C,
}

impl<V, C> CommitOperation<V, C>
where
    V: VersionControl,
    C: CommandRunner,
{
    pub fn new(vcs: V, runner: C) -> Self {
        Self { vcs, runner }
    }

    /// Commits every planned group in order.
    ///
    /// A failing validation command halts the run; that is reported through
    /// [`CommitReport::halted`] and commits already created are kept.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::CommitAborted`] if staging or committing a
    /// group fails, after unstaging that group and restoring the stash.
    /// Returns [`OperationError::StashRestore`] if every group was committed
    /// but the stash could not be restored.
    pub fn execute(
        &self,
        root: &Path,
        analysis: &AnalysisResult,
        config: &CommitConfig,
    ) -> Result<CommitReport> {
        let base_commit = self.vcs.log(root, 1)?.into_iter().next().map(|c| c.sha);
        let conventional = config.conventional_commit_format;

        if config.dry_run {
            let results = analysis
                .groups
                .iter()
                .enumerate()
                .map(|(i, group)| CommitResult {
                    group: group.clone(),
                    commit_id: format!("dry-run-{}", i + 1),
                    message: commit_message(group, analysis, conventional),
                    validation_passed: true,
                })
                .collect();
            info!(groups = analysis.groups.len(), "dry run, nothing committed");
            return Ok(CommitReport {
                results,
                base_commit,
                stash: StashOutcome::Skipped,
                halted: None,
                dry_run: true,
            });
        }

        let (stash, unrelated) = if config.stash_changes {
            self.stash_unrelated(root, analysis)?
        } else {
            (StashOutcome::Disabled, Vec::new())
        };

        let mut results: Vec<CommitResult> = Vec::with_capacity(analysis.groups.len());
        for group in &analysis.groups {
            let message = commit_message(group, analysis, conventional);
            let paths = paths_to_stage(group, analysis);
            let mut run = GroupRun::new(&group.id);

            let commit = match self.stage_and_commit(root, &paths, &message, &mut run) {
                Ok(commit) => commit,
                Err(source) => {
                    run.advance(GroupState::Failed);
                    if let Err(e) = self.vcs.unstage(root, &paths) {
                        warn!(group = %group.id, error = %e, "failed to unstage group");
                    }
                    run.advance(GroupState::RolledBack);
                    return Err(OperationError::CommitAborted {
                        group: group.id.clone(),
                        completed: results,
                        stash: self.restore_after_failure(root, stash, &unrelated),
                        source: Box::new(source),
                    });
                }
            };
            info!(group = %group.id, sha = %commit.sha, "committed group");

            let mut result = CommitResult {
                group: group.clone(),
                commit_id: commit.sha,
                message,
                validation_passed: true,
            };

            if config.validate_each_commit {
                run.advance(GroupState::Validating);
                if let Some(failure) = self.validate(root, group) {
                    run.advance(GroupState::Failed);
                    warn!(
                        group = %group.id,
                        command = %failure.command,
                        exit_code = ?failure.exit_code,
                        "validation failed, halting"
                    );
                    result.validation_passed = false;
                    results.push(result);
                    return Ok(CommitReport {
                        results,
                        base_commit,
                        stash: self.restore_after_failure(root, stash, &unrelated),
                        halted: Some(failure),
                        dry_run: false,
                    });
                }
            }

            run.advance(GroupState::Committed);
            results.push(result);
        }

        let stash = match stash {
            StashOutcome::Stashed { id } => {
                if let Err(e) = self.vcs.stash_pop(root, &id, &as_paths(&unrelated)) {
                    return Err(OperationError::StashRestore {
                        stash: id,
                        completed: results,
                        source: Box::new(e),
                    });
                }
                StashOutcome::Restored { id }
            }
            other => other,
        };

        Ok(CommitReport {
            results,
            base_commit,
            stash,
            halted: None,
            dry_run: false,
        })
    }

    fn stage_and_commit(
        &self,
        root: &Path,
        paths: &[&Path],
        message: &str,
        run: &mut GroupRun<'_>,
    ) -> Result<CommitInfo> {
        run.advance(GroupState::Staging);
        self.vcs.stage(root, paths)?;
        run.advance(GroupState::Committing);
        self.vcs.commit(root, paths, message)
    }

    /// Stashes every change outside the plan. Returns the outcome together
    /// with the stashed paths, which are restored after the run.
    fn stash_unrelated(
        &self,
        root: &Path,
        analysis: &AnalysisResult,
    ) -> Result<(StashOutcome, Vec<PathBuf>)> {
        let keep = planned_paths(analysis);
        let kept: HashSet<&Path> = keep.iter().copied().collect();

        let mut unrelated = Vec::new();
        for entry in self.vcs.status(root)? {
            let related = kept.contains(entry.path.as_path())
                || entry.old_path.as_deref().is_some_and(|old| kept.contains(old));
            if !related {
                unrelated.push(entry.path);
                unrelated.extend(entry.old_path);
            }
        }

        if unrelated.is_empty() {
            return Ok((StashOutcome::NothingToStash, unrelated));
        }

        debug!(files = unrelated.len(), "stashing unrelated changes");
        let outcome = match self.vcs.stash_push(root, &keep)? {
            Some(id) => StashOutcome::Stashed { id },
            None => StashOutcome::NothingToStash,
        };
        Ok((outcome, unrelated))
    }

    fn restore_after_failure(
        &self,
        root: &Path,
        stash: StashOutcome,
        unrelated: &[PathBuf],
    ) -> StashOutcome {
        let StashOutcome::Stashed { id } = stash else {
            return stash;
        };
        match self.vcs.stash_pop(root, &id, &as_paths(unrelated)) {
            Ok(()) => StashOutcome::Restored { id },
            Err(e) => {
                warn!(stash = %id, error = %e, "failed to restore stash");
                StashOutcome::Stashed { id }
            }
        }
    }

    fn validate(&self, root: &Path, group: &AtomicCommitGroup) -> Option<ValidationFailure> {
        for command in &group.validation_commands {
            let failure = |exit_code, output| ValidationFailure {
                group: group.id.clone(),
                command: command.clone(),
                exit_code,
                output,
            };
            match self.runner.run(root, command) {
                Ok(output) if output.success => {
                    debug!(group = %group.id, command = %command, "validation passed");
                }
                Ok(output) => {
                    let combined = [output.stdout, output.stderr]
                        .into_iter()
                        .filter(|s| !s.trim().is_empty())
                        .collect::<Vec<_>>()
                        .join("\n");
                    return Some(failure(output.exit_code, combined));
                }
                Err(e) => return Some(failure(None, e.to_string())),
            }
        }
        None
    }
}

/// Every planned file plus the source side of planned renames, in group
/// order.
fn planned_paths(analysis: &AnalysisResult) -> Vec<&Path> {
    let mut seen = HashSet::new();
    analysis
        .planned_files()
        .map(PathBuf::as_path)
        .chain(analysis.changes.iter().filter_map(|c| c.old_path.as_deref()))
        .filter(|p| seen.insert(*p))
        .collect()
}

fn as_paths(paths: &[PathBuf]) -> Vec<&Path> {
    paths.iter().map(PathBuf::as_path).collect()
}

/// Group files plus the source side of renames, so a rename is committed as
/// one change.
fn paths_to_stage<'a>(group: &'a AtomicCommitGroup, analysis: &'a AnalysisResult) -> Vec<&'a Path> {
    let mut paths: Vec<&Path> = group.files.iter().map(|p| p.as_path()).collect();
    for file in &group.files {
        if let Some(old) = analysis.change(file).and_then(|c| c.old_path.as_deref()) {
            paths.push(old);
        }
    }
    paths
}
