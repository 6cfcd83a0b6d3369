use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use atomic_core::{FileChange, FileKind, GroupKind};
use atomic_graph::DependencyGraph;

use super::GroupDraft;

/// Deletions, then implementation, then tests and configuration. Test and
/// config files that implementation code imports, directly or through other
/// such files, travel with the implementation.
pub(super) fn group(changes: &[FileChange], graph: &DependencyGraph) -> Vec<GroupDraft> {
    let implementation_set = implementation_closure(changes, graph);

    let mut deletions: Vec<PathBuf> = Vec::new();
    let mut implementation: Vec<&FileChange> = Vec::new();
    let mut supporting: Vec<&FileChange> = Vec::new();

    for change in changes {
        if change.is_deleted() {
            deletions.push(change.path.clone());
        } else if implementation_set.contains(change.path.as_path()) {
            implementation.push(change);
        } else {
            supporting.push(change);
        }
    }

    let mut drafts = Vec::new();
    if !deletions.is_empty() {
        drafts.push(GroupDraft::new(GroupKind::Deletion, 0, deletions));
    }
    if !implementation.is_empty() {
        let kind = if implementation.iter().any(|c| c.affects_public_api) {
            GroupKind::CoreApi
        } else {
            GroupKind::Dependent
        };
        drafts.push(GroupDraft::new(kind, 1, paths(&implementation)));
    }
    if !supporting.is_empty() {
        let kind = if supporting.iter().any(|c| c.kind == FileKind::Test) {
            GroupKind::Test
        } else {
            GroupKind::Chore
        };
        drafts.push(GroupDraft::new(kind, 2, paths(&supporting)));
    }
    drafts
}

/// Live source files plus every live file they reach through imports.
fn implementation_closure<'a>(changes: &'a [FileChange], graph: &DependencyGraph) -> HashSet<&'a Path> {
    let live: HashMap<&Path, &FileChange> = changes
        .iter()
        .filter(|c| !c.is_deleted())
        .map(|c| (c.path.as_path(), c))
        .collect();

    let mut members: HashSet<&Path> = HashSet::new();
    let mut pending: Vec<&Path> = changes
        .iter()
        .filter(|c| !c.is_deleted() && c.kind == FileKind::Source)
        .map(|c| c.path.as_path())
        .collect();

    while let Some(path) = pending.pop() {
        if !members.insert(path) {
            continue;
        }
        let Some(node) = graph.node(path) else {
            continue;
        };
        for dependency in &node.dependencies {
            if let Some((&dep, _)) = live.get_key_value(dependency.as_path()) {
                pending.push(dep);
            }
        }
    }
    members
}

fn paths(changes: &[&FileChange]) -> Vec<PathBuf> {
    changes.iter().map(|c| c.path.clone()).collect()
}
