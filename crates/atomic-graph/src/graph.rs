use std::path::{Path, PathBuf};

use atomic_analyzer::{ExportInfo, ImportInfo};
use atomic_core::{FileKind, RiskLevel};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    pub path: PathBuf,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    pub kind: FileKind,
    pub depth: usize,
    pub api_surface_changes: bool,
    /// Changed files this file imports.
    pub dependencies: Vec<PathBuf>,
    /// Unchanged files this file imports.
    pub compilation_dependencies: Vec<PathBuf>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    pub nodes: IndexMap<PathBuf, DependencyNode>,
    /// `edges[p]` lists the changed files that import `p`. Every node has an
    /// entry.
    pub edges: IndexMap<PathBuf, Vec<PathBuf>>,
    /// Nodes with no changed dependencies, sorted.
    pub roots: Vec<PathBuf>,
    /// Strongly connected components with more than one member, each sorted,
    /// ordered by first member.
    pub cycles: Vec<Vec<PathBuf>>,
}

impl DependencyGraph {
    #[must_use]
    pub fn node(&self, path: &Path) -> Option<&DependencyNode> {
        self.nodes.get(path)
    }

    #[must_use]
    pub fn dependents(&self, path: &Path) -> &[PathBuf] {
        self.edges.get(path).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn fan_in(&self, path: &Path) -> usize {
        self.dependents(path).len()
    }

    /// Index into [`Self::cycles`] of the cycle containing `path`.
    #[must_use]
    pub fn cycle_of(&self, path: &Path) -> Option<usize> {
        self.cycles
            .iter()
            .position(|members| members.binary_search_by(|m| m.as_path().cmp(path)).is_ok())
    }

    #[must_use]
    pub fn has_api_changes(&self) -> bool {
        self.nodes.values().any(|n| n.api_surface_changes)
    }
}
