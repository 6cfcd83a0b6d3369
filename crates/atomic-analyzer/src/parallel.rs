use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::{AnalyzerRegistry, ModuleAnalysis, ParseError, Result, SourceFile};

/// A changed file queued for analysis.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisTarget<'a> {
    pub path: &'a Path,
    pub package: &'a str,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Analyzed(ModuleAnalysis),
    /// No analyzer handles this file type.
    Unsupported,
    /// Deleted files are never read.
    Deleted,
    Failed(ParseError),
}

/// Analyzes every target on a pool of at most `jobs` threads (all available
/// cores when `None`). Outcomes come back in target order.
///
/// # Errors
///
/// Returns an error if the thread pool cannot be created. Per-file failures
/// are reported as [`AnalysisOutcome::Failed`].
pub fn analyze_files<F>(
    registry: &AnalyzerRegistry,
    targets: &[AnalysisTarget<'_>],
    package_roots: &[String],
    jobs: Option<usize>,
    load: F,
) -> Result<Vec<AnalysisOutcome>>
where
    F: Fn(&Path) -> std::result::Result<String, ParseError> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.unwrap_or(0))
        .thread_name(|i| format!("atomic-analyze-{i}"))
        .build()?;

    debug!(
        files = targets.len(),
        threads = pool.current_num_threads(),
        "analyzing changed files"
    );

    let outcomes = pool.install(|| {
        targets
            .par_iter()
            .map(|target| analyze_one(registry, target, package_roots, &load))
            .collect()
    });

    Ok(outcomes)
}

fn analyze_one<F>(
    registry: &AnalyzerRegistry,
    target: &AnalysisTarget<'_>,
    package_roots: &[String],
    load: &F,
) -> AnalysisOutcome
where
    F: Fn(&Path) -> std::result::Result<String, ParseError>,
{
    if target.deleted {
        return AnalysisOutcome::Deleted;
    }
    let Some(analyzer) = registry.analyzer_for(target.path) else {
        return AnalysisOutcome::Unsupported;
    };

    let content = match load(target.path) {
        Ok(content) => content,
        Err(e) => return AnalysisOutcome::Failed(e),
    };

    let file = SourceFile {
        path: target.path,
        package: target.package,
        package_roots,
        content: &content,
    };

    match analyzer.analyze(&file) {
        Ok(analysis) => {
            trace!(
                path = %target.path.display(),
                analyzer = analyzer.name(),
                imports = analysis.imports.len(),
                exports = analysis.exports.len(),
                "analyzed file"
            );
            AnalysisOutcome::Analyzed(analysis)
        }
        Err(e) => AnalysisOutcome::Failed(e),
    }
}
