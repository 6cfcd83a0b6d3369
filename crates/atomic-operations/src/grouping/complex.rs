use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use atomic_core::path::{module_key, test_subject_key};
use atomic_core::{FileChange, FileKind, GroupKind};
use atomic_graph::DependencyGraph;

use super::{GroupDraft, TRAILING_DEPTH};

/// Graph-driven grouping: deletions first, then one group per cycle and one
/// per (kind, depth) band, then tests and configuration nothing depends on.
pub(super) fn group(
    changes: &[FileChange],
    graph: &DependencyGraph,
    attach_tests: bool,
) -> Vec<GroupDraft> {
    let depth_of = |path: &Path| graph.node(path).map_or(0, |n| n.depth);

    let mut drafts: Vec<GroupDraft> = Vec::new();
    let mut group_of: HashMap<PathBuf, usize> = HashMap::new();

    let deletions: Vec<PathBuf> = changes
        .iter()
        .filter(|c| c.is_deleted())
        .map(|c| c.path.clone())
        .collect();
    if !deletions.is_empty() {
        place(&mut drafts, &mut group_of, GroupDraft::new(GroupKind::Deletion, 0, deletions));
    }

    let live: Vec<&FileChange> = changes.iter().filter(|c| !c.is_deleted()).collect();
    let by_path: HashMap<&Path, &FileChange> =
        live.iter().map(|c| (c.path.as_path(), *c)).collect();
    let terminal = terminal_files(&live, graph);

    for members in &graph.cycles {
        let members: Vec<PathBuf> = members
            .iter()
            .filter(|m| by_path.contains_key(m.as_path()))
            .cloned()
            .collect();
        let Some(first) = members.first() else {
            continue;
        };
        let api = members
            .iter()
            .any(|m| by_path.get(m.as_path()).is_some_and(|c| c.affects_public_api));
        let draft = GroupDraft::new(band_kind(api), depth_of(first.as_path()), members);
        place(&mut drafts, &mut group_of, draft);
    }

    let mut bands: BTreeMap<(GroupKind, usize), Vec<PathBuf>> = BTreeMap::new();
    for change in &live {
        if terminal.contains(change.path.as_path()) || group_of.contains_key(&change.path) {
            continue;
        }
        bands
            .entry((band_kind(change.affects_public_api), depth_of(change.path.as_path())))
            .or_default()
            .push(change.path.clone());
    }
    for ((kind, depth), files) in bands {
        place(&mut drafts, &mut group_of, GroupDraft::new(kind, depth, files));
    }

    let mut tests: Vec<&FileChange> = live
        .iter()
        .copied()
        .filter(|c| c.kind == FileKind::Test && terminal.contains(c.path.as_path()))
        .collect();
    tests.sort_by_key(|c| depth_of(c.path.as_path()));

    let mut trailing_tests = Vec::new();
    for test in tests {
        let target = if attach_tests {
            implementation_group(test, &live, &drafts, &group_of)
                .filter(|&g| dependencies_settled(test, g, graph, &drafts, &group_of))
        } else {
            None
        };
        match target {
            Some(g) => {
                drafts[g].files.push(test.path.clone());
                group_of.insert(test.path.clone(), g);
            }
            None => trailing_tests.push(test.path.clone()),
        }
    }
    if !trailing_tests.is_empty() {
        let draft = GroupDraft::new(GroupKind::Test, TRAILING_DEPTH, trailing_tests);
        place(&mut drafts, &mut group_of, draft);
    }

    let chores: Vec<PathBuf> = live
        .iter()
        .filter(|c| c.kind == FileKind::Config && terminal.contains(c.path.as_path()))
        .map(|c| c.path.clone())
        .collect();
    if !chores.is_empty() {
        let draft = GroupDraft::new(GroupKind::Chore, TRAILING_DEPTH, chores);
        place(&mut drafts, &mut group_of, draft);
    }

    drafts
}

fn band_kind(api: bool) -> GroupKind {
    if api {
        GroupKind::CoreApi
    } else {
        GroupKind::Dependent
    }
}

fn place(drafts: &mut Vec<GroupDraft>, group_of: &mut HashMap<PathBuf, usize>, draft: GroupDraft) {
    let index = drafts.len();
    for file in &draft.files {
        group_of.insert(file.clone(), index);
    }
    drafts.push(draft);
}

/// Files that can trail the graph-ordered groups: configuration nothing
/// imports, and tests imported only by other such tests. Cycle members never
/// qualify.
fn terminal_files<'a>(live: &[&'a FileChange], graph: &DependencyGraph) -> HashSet<&'a Path> {
    let mut ordered = live.to_vec();
    ordered.sort_by_key(|c| Reverse(graph.node(&c.path).map_or(0, |n| n.depth)));

    let mut terminal: HashSet<&Path> = HashSet::new();
    for change in ordered {
        if graph.cycle_of(&change.path).is_some() {
            continue;
        }
        let dependents = graph.dependents(&change.path);
        let is_terminal = match change.kind {
            FileKind::Source => false,
            FileKind::Config => dependents.is_empty(),
            FileKind::Test => dependents.iter().all(|d| terminal.contains(d.as_path())),
        };
        if is_terminal {
            terminal.insert(change.path.as_path());
        }
    }
    terminal
}

/// Group of the file `test` is named after, when that group is a
/// graph-ordered implementation group.
fn implementation_group(
    test: &FileChange,
    live: &[&FileChange],
    drafts: &[GroupDraft],
    group_of: &HashMap<PathBuf, usize>,
) -> Option<usize> {
    let subject = test_subject_key(&test.path)?;
    live.iter()
        .filter(|c| c.kind != FileKind::Test && module_key(&c.path) == subject)
        .find_map(|c| group_of.get(&c.path).copied())
        .filter(|&g| matches!(drafts[g].kind, GroupKind::CoreApi | GroupKind::Dependent))
}

/// Every changed dependency of `test` is committed by the deletion group,
/// by `target` itself, or by a strictly shallower group.
fn dependencies_settled(
    test: &FileChange,
    target: usize,
    graph: &DependencyGraph,
    drafts: &[GroupDraft],
    group_of: &HashMap<PathBuf, usize>,
) -> bool {
    let Some(node) = graph.node(&test.path) else {
        return true;
    };
    node.dependencies.iter().all(|dependency| {
        group_of.get(dependency).is_some_and(|&g| {
            g == target
                || drafts[g].kind == GroupKind::Deletion
                || drafts[g].depth < drafts[target].depth
        })
    })
}
