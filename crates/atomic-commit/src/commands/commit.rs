use std::path::Path;

use atomic_operations::CommitConfig;
use atomic_operations::operations::CommitOperation;
use atomic_operations::providers::{Git2VersionControl, ShellCommandRunner};
use clap::Args;
use tracing::info;

use super::{AnalysisArgs, Session};
use crate::error::{CliError, Result};
use crate::output::{OutputFormat, format_report};

#[derive(Args, Debug)]
pub(crate) struct CommitArgs {
    /// Show what would be committed without touching the repository
    #[arg(long)]
    pub dry_run: bool,

    /// Stash changes outside the plan while committing
    #[arg(long)]
    pub stash: bool,

    /// Run the validation commands after every commit
    #[arg(long)]
    pub validate: bool,

    /// Prefix messages with a conventional-commit type
    #[arg(long)]
    pub conventional: bool,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

impl CommitArgs {
    fn apply(&self, config: &CommitConfig, analysis_dry_run: bool) -> CommitConfig {
        CommitConfig {
            dry_run: config.dry_run || analysis_dry_run || self.dry_run,
            stash_changes: config.stash_changes || self.stash,
            validate_each_commit: config.validate_each_commit || self.validate,
            conventional_commit_format: config.conventional_commit_format || self.conventional,
        }
    }
}

pub(crate) fn run(start_path: &Path, args: CommitArgs) -> Result<()> {
    let session = Session::open(start_path)?;
    let analysis_config = args.analysis.apply(session.file_config.analysis.clone());
    let commit_config = args.apply(&session.file_config.commit, analysis_config.dry_run);
    analysis_config.validate()?;
    commit_config.validate(&analysis_config)?;

    let (analysis, _ctx) = session.analyze(analysis_config, args.analysis.profile)?;
    if analysis.groups.is_empty() {
        info!("working tree is clean, nothing to commit");
    }

    let operation = CommitOperation::new(Git2VersionControl::new(), ShellCommandRunner::new());
    let report = operation.execute(&session.root, &analysis, &commit_config)?;

    match args.analysis.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", format_report(&report)),
    }

    match report.halted {
        Some(failure) => Err(CliError::ValidationHalted {
            group: failure.group,
            command: failure.command,
        }),
        None => Ok(()),
    }
}
