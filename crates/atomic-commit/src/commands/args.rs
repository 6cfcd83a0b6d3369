use atomic_core::ModeSelection;
use atomic_operations::AnalysisConfig;
use clap::Args;

use crate::output::OutputFormat;

/// Flags that override `[analysis]` settings from the config file.
#[derive(Args, Debug, Default)]
pub(crate) struct AnalysisArgs {
    /// Grouping strategy
    #[arg(long, value_enum)]
    pub mode: Option<ModeSelection>,

    /// File count at which auto mode switches to graph-driven grouping
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Leave matching files out of the plan (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Prefer simple grouping even when the public API changes
    #[arg(long)]
    pub prefer_simple: bool,

    /// Keep tests in a trailing group instead of next to their implementation
    #[arg(long)]
    pub separate_tests: bool,

    /// Command to run after each commit (repeatable)
    #[arg(long = "validation-command", value_name = "CMD")]
    pub validation_commands: Vec<String>,

    /// Analyzer threads (default: all cores)
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Report how long each analysis stage took
    #[arg(long)]
    pub profile: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl AnalysisArgs {
    /// Applies the flags on top of `config`. List flags extend the configured
    /// lists rather than replacing them.
    pub(crate) fn apply(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(threshold) = self.threshold {
            config.complexity_threshold = threshold;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = Some(jobs);
        }
        if self.prefer_simple {
            config.prefer_simple_grouping = true;
        }
        if self.separate_tests {
            config.group_tests_with_implementation = false;
        }
        config.exclude_files.extend(self.exclude.iter().cloned());
        config
            .validation_commands
            .extend(self.validation_commands.iter().cloned());
        config
    }
}
