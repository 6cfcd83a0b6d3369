use std::collections::HashSet;
use std::path::{Path, PathBuf};

use atomic_analyzer::{
    AnalysisOutcome, AnalysisTarget, AnalyzerRegistry, ParseError, analyze_files,
};
use atomic_core::{AnalysisResult, ChangeEntry, FileChange};
use atomic_git::StatusEntry;
use atomic_graph::{DependencyGraph, NodeInput};
use tracing::{debug, info, warn};

use crate::grouping::{group_changes, select_mode};
use crate::planner::plan;
use crate::traits::SourceReader;
use crate::{AnalysisConfig, Profiler, Result};

const SECONDS_PER_GROUP: u64 = 5;
const SECONDS_PER_VALIDATION: u64 = 15;

/// Everything one analysis run needs besides its input.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub config: AnalysisConfig,
    pub profiler: Profiler,
}

impl AnalysisContext {
    #[must_use]
    pub fn new(config: AnalysisConfig, profile: bool) -> Self {
        Self {
            config,
            profiler: Profiler::new(profile),
        }
    }
}

/// Converts `git status` entries into change-set input.
#[must_use]
pub fn change_entries_from_status(entries: &[StatusEntry]) -> Vec<ChangeEntry> {
    entries
        .iter()
        .map(|entry| {
            let change = ChangeEntry::new(entry.path.clone(), entry.porcelain_code());
            match &entry.old_path {
                Some(old) => change.with_old_path(old.clone()),
                None => change,
            }
        })
        .collect()
}

pub struct AnalyzeOperation<R> {
    reader: R,
    registry: AnalyzerRegistry,
}

impl<R> AnalyzeOperation<R>
where
    R: SourceReader,
{
    pub fn new(reader: R) -> Self {
        Self::with_registry(reader, AnalyzerRegistry::default())
    }

    pub fn with_registry(reader: R, registry: AnalyzerRegistry) -> Self {
        Self { reader, registry }
    }

    /// Analyzes a change set and plans its commit groups.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a status code is not
    /// recognized, the analysis pool cannot be built, or the groups cannot be
    /// ordered. Files that fail to parse only produce warnings.
    pub fn execute(
        &self,
        root: &Path,
        entries: &[ChangeEntry],
        ctx: &mut AnalysisContext,
    ) -> Result<AnalysisResult> {
        let config = &ctx.config;
        let excludes = config.validate()?;

        let mut warnings = Vec::new();
        let mut excluded_files = Vec::new();
        let mut changes: Vec<FileChange> = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        for entry in entries {
            let change = FileChange::from_entry(entry, &config.package_roots)?;
            if !seen.insert(change.path.clone()) {
                warn!(path = %change.path.display(), "duplicate change entry ignored");
                warnings.push(format!(
                    "duplicate entry for {} ignored",
                    change.path.display()
                ));
                continue;
            }
            if excludes.is_match(&change.path) {
                debug!(path = %change.path.display(), "excluded by pattern");
                excluded_files.push(change.path);
                continue;
            }
            changes.push(change);
        }

        let outcomes = ctx.profiler.time("analysis", || {
            let targets: Vec<AnalysisTarget<'_>> = changes
                .iter()
                .map(|c| AnalysisTarget {
                    path: &c.path,
                    package: &c.package,
                    deleted: c.is_deleted(),
                })
                .collect();
            analyze_files(
                &self.registry,
                &targets,
                &config.package_roots,
                config.jobs,
                |path| self.load(root, path),
            )
        })?;

        let graph = ctx.profiler.time("graph", || {
            let inputs = changes
                .iter_mut()
                .zip(outcomes)
                .map(|(change, outcome)| node_input(change, outcome, &mut warnings))
                .collect();
            atomic_graph::build(inputs)
        });
        annotate(&mut changes, &graph);
        for cycle in &graph.cycles {
            let members: Vec<String> = cycle.iter().map(|p| p.display().to_string()).collect();
            warnings.push(format!(
                "import cycle committed as one group: {}",
                members.join(", ")
            ));
        }

        let mode = select_mode(config, changes.len(), graph.has_api_changes());
        let drafts = ctx
            .profiler
            .time("grouping", || group_changes(mode, &changes, &graph, config));
        let groups = ctx.profiler.time("planning", || {
            plan(drafts, &graph, &changes, &config.validation_commands)
        })?;

        let estimated_time_secs = estimate_seconds(
            groups.len(),
            config.validation_commands.len(),
            changes.len(),
        );

        info!(
            %mode,
            files = changes.len(),
            groups = groups.len(),
            excluded = excluded_files.len(),
            "planned atomic commits"
        );

        Ok(AnalysisResult {
            mode,
            total_files: changes.len(),
            groups,
            warnings,
            estimated_time_secs,
            excluded_files,
            changes,
        })
    }

    fn load(&self, root: &Path, path: &Path) -> std::result::Result<String, ParseError> {
        let bytes = self
            .reader
            .read(root, path)
            .map_err(|e| ParseError::Unreadable(e.to_string()))?;
        if bytes.contains(&0) {
            return Err(ParseError::Binary);
        }
        String::from_utf8(bytes).map_err(|_| ParseError::InvalidUtf8)
    }
}

fn node_input(change: &mut FileChange, outcome: AnalysisOutcome, warnings: &mut Vec<String>) -> NodeInput {
    let mut input = NodeInput {
        path: change.path.clone(),
        kind: change.kind,
        imports: Vec::new(),
        exports: Vec::new(),
        api_surface_changes: false,
    };
    match outcome {
        AnalysisOutcome::Analyzed(analysis) => {
            input.imports = analysis.imports;
            input.exports = analysis.exports;
            input.api_surface_changes = analysis.has_api_changes;
        }
        AnalysisOutcome::Unsupported | AnalysisOutcome::Deleted => {}
        AnalysisOutcome::Failed(e) => {
            warn!(path = %change.path.display(), error = %e, "analysis failed");
            warnings.push(format!("failed to analyze {}: {e}", change.path.display()));
            input.api_surface_changes = true;
            change.analysis_failed = true;
        }
    }
    input
}

fn annotate(changes: &mut [FileChange], graph: &DependencyGraph) {
    for change in changes {
        if let Some(node) = graph.node(&change.path) {
            change.has_import_changes = !node.dependencies.is_empty();
            change.affects_public_api = node.api_surface_changes;
            change.risk_level = node.risk_level;
        }
    }
}

fn estimate_seconds(groups: usize, validation_commands: usize, files: usize) -> u64 {
    let per_group = SECONDS_PER_GROUP + SECONDS_PER_VALIDATION * validation_commands as u64;
    (groups as u64).saturating_mul(per_group).saturating_add(files as u64)
}
