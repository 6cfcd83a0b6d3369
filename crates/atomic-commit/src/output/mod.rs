mod text;

use atomic_core::AnalysisResult;
use atomic_operations::StageTiming;
use clap::ValueEnum;
use serde::Serialize;

pub(crate) use text::{format_plan, format_report};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON shape of `plan`: the analysis result with optional stage timings.
#[derive(Serialize)]
pub(crate) struct PlanOutput<'a> {
    #[serde(flatten)]
    pub plan: &'a AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timings: Option<&'a [StageTiming]>,
}
