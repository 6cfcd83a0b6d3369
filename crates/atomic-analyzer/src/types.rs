use std::path::{Path, PathBuf};

use atomic_core::path::package_of;

/// Input handed to a [`crate::ModuleAnalyzer`].
#[derive(Debug, Clone, Copy)]
pub struct SourceFile<'a> {
    pub path: &'a Path,
    pub package: &'a str,
    pub package_roots: &'a [String],
    pub content: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// Resolves to a file inside the repository.
    Relative,
    /// A third-party or workspace package referenced by name.
    Package,
    /// The language's standard library (`node:fs`, `std::io`).
    Builtin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    pub specifier: String,
    pub kind: ImportKind,
    pub type_only: bool,
    /// Repository-relative paths the import may resolve to, most likely
    /// first. Empty for package and builtin imports.
    pub candidates: Vec<PathBuf>,
}

impl ImportInfo {
    #[must_use]
    pub fn package(specifier: impl Into<String>, type_only: bool) -> Self {
        Self {
            specifier: specifier.into(),
            kind: ImportKind::Package,
            type_only,
            candidates: Vec::new(),
        }
    }

    #[must_use]
    pub fn builtin(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            kind: ImportKind::Builtin,
            type_only: false,
            candidates: Vec::new(),
        }
    }

    #[must_use]
    pub fn relative(specifier: impl Into<String>, type_only: bool, candidates: Vec<PathBuf>) -> Self {
        Self {
            specifier: specifier.into(),
            kind: ImportKind::Relative,
            type_only,
            candidates,
        }
    }

    /// Whether the imported module lives outside the importing file's package.
    fn leaves_package(&self, file: &SourceFile<'_>) -> bool {
        match self.kind {
            ImportKind::Builtin => false,
            ImportKind::Package => true,
            ImportKind::Relative => self
                .candidates
                .first()
                .is_some_and(|c| package_of(c, file.package_roots) != file.package),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportInfo {
    pub name: String,
    pub type_only: bool,
}

impl ExportInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, type_only: bool) -> Self {
        Self {
            name: name.into(),
            type_only,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleAnalysis {
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    pub has_api_changes: bool,
}

impl ModuleAnalysis {
    /// Builds an analysis and derives `has_api_changes`: any value export, or
    /// any value import reaching outside the file's package.
    #[must_use]
    pub fn new(file: &SourceFile<'_>, imports: Vec<ImportInfo>, exports: Vec<ExportInfo>) -> Self {
        let exports_values = exports.iter().any(|e| !e.type_only);
        let imports_foreign = imports
            .iter()
            .any(|i| !i.type_only && i.leaves_package(file));

        Self {
            has_api_changes: exports_values || imports_foreign,
            imports,
            exports,
        }
    }
}
