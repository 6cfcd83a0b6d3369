mod args;
mod commit;
mod plan;

use std::path::{Path, PathBuf};

use atomic_core::AnalysisResult;
use atomic_operations::operations::{AnalysisContext, AnalyzeOperation, change_entries_from_status};
use atomic_operations::providers::{FileSystemSourceReader, Git2VersionControl};
use atomic_operations::traits::VersionControl;
use atomic_operations::{AnalysisConfig, ConfigFile};
use clap::Subcommand;

pub(crate) use args::AnalysisArgs;
use commit::CommitArgs;
use plan::PlanArgs;

use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Print the ordered commit plan for the current changes
    Plan(PlanArgs),
    /// Create one commit per planned group
    Commit(CommitArgs),
}

impl Commands {
    pub(crate) fn execute(self, start_path: &Path) -> Result<()> {
        match self {
            Self::Plan(args) => plan::run(start_path, args),
            Self::Commit(args) => commit::run(start_path, args),
        }
    }
}

/// Repository root, file configuration, and working-tree analysis shared by
/// every command.
pub(crate) struct Session {
    pub root: PathBuf,
    pub file_config: ConfigFile,
}

impl Session {
    pub(crate) fn open(start_path: &Path) -> Result<Self> {
        let root = atomic_git::repository_root(start_path)?;
        let file_config = ConfigFile::load(&root)?;
        Ok(Self { root, file_config })
    }

    pub(crate) fn analyze(
        &self,
        config: AnalysisConfig,
        profile: bool,
    ) -> Result<(AnalysisResult, AnalysisContext)> {
        let status = Git2VersionControl::new().status(&self.root)?;
        let entries = change_entries_from_status(&status);

        let mut ctx = AnalysisContext::new(config, profile);
        let operation = AnalyzeOperation::new(FileSystemSourceReader::new());
        let result = operation.execute(&self.root, &entries, &mut ctx)?;
        Ok((result, ctx))
    }
}
