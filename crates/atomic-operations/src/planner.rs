use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use std::path::{Path, PathBuf};

use atomic_core::{AtomicCommitGroup, FileChange, GroupKind, RiskLevel};
use atomic_graph::DependencyGraph;
use tracing::debug;

use crate::error::PlanningError;
use crate::grouping::{GroupDraft, describe_group};

/// Orders drafted groups so that every group follows the groups it depends
/// on, breaking ties by band, depth and first file.
///
/// # Errors
///
/// Returns [`PlanningError`] if the groups depend on each other in a cycle.
pub(crate) fn plan(
    mut drafts: Vec<GroupDraft>,
    graph: &DependencyGraph,
    changes: &[FileChange],
    validation_commands: &[String],
) -> Result<Vec<AtomicCommitGroup>, PlanningError> {
    for draft in &mut drafts {
        draft.files.sort();
    }

    let owner: HashMap<&Path, usize> = drafts
        .iter()
        .enumerate()
        .flat_map(|(i, d)| d.files.iter().map(move |f| (f.as_path(), i)))
        .collect();

    let dependencies: Vec<BTreeSet<usize>> = drafts
        .iter()
        .enumerate()
        .map(|(i, draft)| {
            draft
                .files
                .iter()
                .filter_map(|f| graph.node(f))
                .flat_map(|node| node.dependencies.iter())
                .filter_map(|dep| owner.get(dep.as_path()).copied())
                .filter(|&j| j != i)
                .collect()
        })
        .collect();

    let order = topological_order(&drafts, &dependencies)?;

    let mut position = vec![0; drafts.len()];
    for (pos, &index) in order.iter().enumerate() {
        position[index] = pos;
    }
    let ids: Vec<String> = drafts
        .iter()
        .enumerate()
        .map(|(i, d)| group_id(position[i], d.kind))
        .collect();

    let risk: HashMap<&Path, RiskLevel> = changes
        .iter()
        .map(|c| (c.path.as_path(), c.risk_level))
        .collect();

    let groups: Vec<AtomicCommitGroup> = order
        .iter()
        .enumerate()
        .map(|(priority, &index)| {
            let draft = &drafts[index];
            let mut depends_on: Vec<usize> = dependencies[index].iter().copied().collect();
            depends_on.sort_by_key(|&j| position[j]);

            AtomicCommitGroup {
                id: ids[index].clone(),
                priority,
                description: describe_group(draft.kind, &draft.files),
                dependencies: depends_on.iter().map(|&j| ids[j].clone()).collect(),
                validation_commands: validation_commands.to_vec(),
                estimated_risk: draft
                    .files
                    .iter()
                    .filter_map(|f| risk.get(f.as_path()).copied())
                    .max()
                    .unwrap_or_default(),
                can_parallelize: depends_on.is_empty(),
                kind: draft.kind,
                files: draft.files.clone(),
            }
        })
        .collect();

    debug!(groups = groups.len(), "planned commit groups");
    Ok(groups)
}

fn group_id(position: usize, kind: GroupKind) -> String {
    format!("g{:02}-{kind}", position + 1)
}

/// Kahn's algorithm over the group dependency graph with a min-heap keyed by
/// (kind, depth, first file).
fn topological_order(
    drafts: &[GroupDraft],
    dependencies: &[BTreeSet<usize>],
) -> Result<Vec<usize>, PlanningError> {
    let mut in_degree: Vec<usize> = dependencies.iter().map(BTreeSet::len).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); drafts.len()];
    for (i, deps) in dependencies.iter().enumerate() {
        for &j in deps {
            dependents[j].push(i);
        }
    }

    let key = |i: usize| {
        let draft = &drafts[i];
        Reverse((draft.kind, draft.depth, draft.files.first().cloned(), i))
    };

    let mut ready: BinaryHeap<Reverse<(GroupKind, usize, Option<PathBuf>, usize)>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| key(i))
        .collect();

    let mut order = Vec::with_capacity(drafts.len());
    while let Some(Reverse((_, _, _, i))) = ready.pop() {
        order.push(i);
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(key(dependent));
            }
        }
    }

    if order.len() < drafts.len() {
        let groups = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d > 0)
            .map(|(i, _)| drafts[i].files.clone())
            .collect();
        return Err(PlanningError { groups });
    }
    Ok(order)
}
