//! Partitions an analyzed change set into commit groups.

mod complex;
mod describe;
mod simple;

use std::path::PathBuf;

use atomic_core::{AnalysisMode, FileChange, FileKind, GroupKind, ModeSelection};
use atomic_graph::DependencyGraph;

use crate::AnalysisConfig;

pub use describe::describe_group;

/// Sort depth for groups that always come after every graph-ordered group.
pub const TRAILING_DEPTH: usize = usize::MAX;

/// A group before ordering: its kind, the graph depth it was built for, and
/// its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDraft {
    pub kind: GroupKind,
    pub depth: usize,
    pub files: Vec<PathBuf>,
}

impl GroupDraft {
    #[must_use]
    pub fn new(kind: GroupKind, depth: usize, files: Vec<PathBuf>) -> Self {
        Self { kind, depth, files }
    }
}

/// A forced mode wins; otherwise large or API-changing change sets get the
/// graph-driven strategy.
#[must_use]
pub fn select_mode(config: &AnalysisConfig, total_files: usize, has_api_changes: bool) -> AnalysisMode {
    match config.mode {
        ModeSelection::Simple => AnalysisMode::Simple,
        ModeSelection::Complex => AnalysisMode::Complex,
        ModeSelection::Auto => {
            if total_files >= config.complexity_threshold
                || (!config.prefer_simple_grouping && has_api_changes)
            {
                AnalysisMode::Complex
            } else {
                AnalysisMode::Simple
            }
        }
    }
}

/// Builds the unordered groups for `mode`. Every change lands in exactly one
/// group and empty groups are never produced. Files that could not be
/// analyzed get a group of their own.
#[must_use]
pub fn group_changes(
    mode: AnalysisMode,
    changes: &[FileChange],
    graph: &DependencyGraph,
    config: &AnalysisConfig,
) -> Vec<GroupDraft> {
    let (isolated, analyzed): (Vec<FileChange>, Vec<FileChange>) = changes
        .iter()
        .cloned()
        .partition(|c| c.analysis_failed && !c.is_deleted());

    let mut drafts = match mode {
        AnalysisMode::Simple => simple::group(&analyzed, graph),
        AnalysisMode::Complex => {
            complex::group(&analyzed, graph, config.group_tests_with_implementation)
        }
    };
    drafts.extend(isolated.into_iter().map(|change| {
        let kind = if change.kind == FileKind::Test {
            GroupKind::Test
        } else {
            GroupKind::CoreApi
        };
        let depth = graph.node(&change.path).map_or(0, |n| n.depth);
        GroupDraft::new(kind, depth, vec![change.path])
    }));
    drafts
}
