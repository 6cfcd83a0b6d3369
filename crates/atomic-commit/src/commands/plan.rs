use std::path::Path;

use clap::Args;

use super::{AnalysisArgs, Session};
use crate::error::Result;
use crate::output::{OutputFormat, PlanOutput, format_plan};

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

pub(crate) fn run(start_path: &Path, args: PlanArgs) -> Result<()> {
    let session = Session::open(start_path)?;
    let config = args.analysis.apply(session.file_config.analysis.clone());
    config.validate()?;

    let (result, ctx) = session.analyze(config, args.analysis.profile)?;
    let timings = ctx.profiler.is_enabled().then(|| ctx.profiler.report());

    match args.analysis.format {
        OutputFormat::Json => {
            let output = PlanOutput {
                plan: &result,
                timings,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => print!("{}", format_plan(&result, timings)),
    }
    Ok(())
}
