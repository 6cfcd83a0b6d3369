use std::path::PathBuf;

use atomic_analyzer::{ExportInfo, ImportInfo, ImportKind};
use atomic_core::{FileKind, RiskLevel};
use indexmap::IndexMap;
use tracing::debug;

use crate::depth::condensation_depths;
use crate::risk::classify_risk;
use crate::scc::strongly_connected_components;
use crate::{DependencyGraph, DependencyNode};

/// One changed file with its analysis results.
#[derive(Debug, Clone)]
pub struct NodeInput {
    pub path: PathBuf,
    pub kind: FileKind,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    pub api_surface_changes: bool,
}

/// Builds the dependency graph of a change set: resolves imports against the
/// changed files, then annotates depth, cycles and risk.
#[must_use]
pub fn build(inputs: Vec<NodeInput>) -> DependencyGraph {
    let mut nodes: IndexMap<PathBuf, DependencyNode> = inputs
        .into_iter()
        .map(|input| {
            let node = DependencyNode {
                path: input.path.clone(),
                imports: input.imports,
                exports: input.exports,
                kind: input.kind,
                depth: 0,
                api_surface_changes: input.api_surface_changes,
                dependencies: Vec::new(),
                compilation_dependencies: Vec::new(),
                risk_level: RiskLevel::Low,
            };
            (input.path, node)
        })
        .collect();

    let resolved: Vec<(Vec<PathBuf>, Vec<PathBuf>)> = nodes
        .values()
        .map(|node| resolve_imports(node, &nodes))
        .collect();

    let mut edges: IndexMap<PathBuf, Vec<PathBuf>> =
        nodes.keys().map(|k| (k.clone(), Vec::new())).collect();

    for (node, (dependencies, compilation)) in nodes.values_mut().zip(resolved) {
        for dependency in &dependencies {
            if let Some(importers) = edges.get_mut(dependency) {
                importers.push(node.path.clone());
            }
        }
        node.dependencies = dependencies;
        node.compilation_dependencies = compilation;
    }
    for importers in edges.values_mut() {
        importers.sort();
    }

    let adjacency: Vec<Vec<usize>> = edges
        .values()
        .map(|importers| {
            importers
                .iter()
                .filter_map(|p| nodes.get_index_of(p))
                .collect()
        })
        .collect();

    let components = strongly_connected_components(&adjacency);
    let depths = condensation_depths(&adjacency, &components);

    let mut cycles: Vec<Vec<PathBuf>> = components
        .iter()
        .filter(|members| members.len() > 1)
        .map(|members| {
            let mut paths: Vec<PathBuf> = members
                .iter()
                .filter_map(|&i| nodes.get_index(i).map(|(p, _)| p.clone()))
                .collect();
            paths.sort();
            paths
        })
        .collect();
    cycles.sort();

    for ((path, node), depth) in nodes.iter_mut().zip(depths) {
        node.depth = depth;
        let fan_in = edges.get(path).map_or(0, Vec::len);
        node.risk_level = classify_risk(node.api_surface_changes, fan_in);
    }

    let mut roots: Vec<PathBuf> = nodes
        .values()
        .filter(|n| n.dependencies.is_empty())
        .map(|n| n.path.clone())
        .collect();
    roots.sort();

    debug!(
        nodes = nodes.len(),
        edges = edges.values().map(Vec::len).sum::<usize>(),
        cycles = cycles.len(),
        roots = roots.len(),
        "built dependency graph"
    );

    DependencyGraph {
        nodes,
        edges,
        roots,
        cycles,
    }
}

/// Splits a node's imports into changed dependencies (first candidate that
/// is part of the change set) and unchanged relative dependencies.
fn resolve_imports(
    node: &DependencyNode,
    nodes: &IndexMap<PathBuf, DependencyNode>,
) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut dependencies = Vec::new();
    let mut compilation = Vec::new();

    for import in &node.imports {
        let changed = import
            .candidates
            .iter()
            .find(|c| **c != node.path && nodes.contains_key(*c));

        match changed {
            Some(target) => {
                if !dependencies.contains(target) {
                    dependencies.push(target.clone());
                }
            }
            None if import.kind == ImportKind::Relative => {
                if let Some(first) = import
                    .candidates
                    .first()
                    .filter(|f| **f != node.path && !compilation.contains(*f))
                {
                    compilation.push(first.clone());
                }
            }
            None => {}
        }
    }

    (dependencies, compilation)
}
