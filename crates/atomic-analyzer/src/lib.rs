//! Per-file module analysis: which files a changed file imports, what it
//! exports, and whether the change touches its public surface.
//!
//! Languages plug in through [`ModuleAnalyzer`]; [`AnalyzerRegistry`] picks
//! one by file extension and [`analyze_files`] runs them on a bounded pool.

mod ecmascript;
mod error;
mod parallel;
mod registry;
mod rust;
mod syntax;
mod types;

pub use ecmascript::EcmaScriptAnalyzer;
pub use error::{AnalyzerError, ParseError};
pub use parallel::{AnalysisOutcome, AnalysisTarget, analyze_files};
pub use registry::AnalyzerRegistry;
pub use rust::RustAnalyzer;
pub use types::{ExportInfo, ImportInfo, ImportKind, ModuleAnalysis, SourceFile};

pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Extracts imports and exports from one language's source files.
pub trait ModuleAnalyzer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lowercase file extensions handled by this analyzer, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// # Errors
    ///
    /// Returns [`ParseError`] if the content does not parse.
    fn analyze(&self, file: &SourceFile<'_>) -> std::result::Result<ModuleAnalysis, ParseError>;
}
