use std::path::Path;

use crate::{EcmaScriptAnalyzer, ModuleAnalyzer, RustAnalyzer};

/// Picks a [`ModuleAnalyzer`] by file extension.
pub struct AnalyzerRegistry {
    analyzers: Vec<Box<dyn ModuleAnalyzer>>,
}

impl AnalyzerRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            analyzers: Vec::new(),
        }
    }

    /// Later registrations win when two analyzers claim the same extension.
    #[must_use]
    pub fn with(mut self, analyzer: impl ModuleAnalyzer + 'static) -> Self {
        self.register(Box::new(analyzer));
        self
    }

    pub fn register(&mut self, analyzer: Box<dyn ModuleAnalyzer>) {
        self.analyzers.insert(0, analyzer);
    }

    #[must_use]
    pub fn analyzer_for(&self, path: &Path) -> Option<&dyn ModuleAnalyzer> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.analyzers
            .iter()
            .find(|a| a.extensions().contains(&ext.as_str()))
            .map(AsRef::as_ref)
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::empty().with(EcmaScriptAnalyzer).with(RustAnalyzer)
    }
}
