mod config;
mod error;
pub mod grouping;
mod planner;
pub mod operations;
mod profiler;
pub mod providers;
pub mod traits;

#[cfg(test)]
pub mod mocks;

pub use config::{AnalysisConfig, CONFIG_FILE_NAME, CommitConfig, ConfigFile};
pub use error::{ConfigError, OperationError, PlanningError, Result};
pub use profiler::{Profiler, StageTiming};
