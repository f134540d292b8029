use super::CliError;
use super::helpers::{render_human_summary, write_summary_report};
use iirmaker_core::domain::AggregatorConfig;
use iirmaker_core::modules::aggregate;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct AggregateArgs {
    /// Directory holding facuIn<outer><inner>.txt; outCoeffs.txt is written here
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Optional JSON run summary path
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl AggregateArgs {
    fn into_config(self) -> (AggregatorConfig, Option<PathBuf>) {
        (AggregatorConfig::new(self.dir), self.summary)
    }
}

pub(super) fn run_aggregate_command(args: AggregateArgs) -> Result<i32, CliError> {
    let (config, summary_path) = args.into_config();
    let summary = aggregate(&config).map_err(CliError::Compute)?;
    println!("{}", render_human_summary(&summary));

    if let Some(path) = summary_path {
        write_summary_report(&path, &summary)?;
        println!("JSON summary: {}", path.display());
    }

    Ok(0)
}
