mod commands;
mod helpers;

use clap::Parser;
use iirmaker_core::domain::IirError;

const PROGRAM_NAME: &str = "iirmaker";

/// Program names that run `aggregate` directly when the binary is invoked
/// through a link or copy under that name.
const AGGREGATE_ALIASES: [&str; 2] = ["armiirmaker", "facu2coeffs"];

pub fn run_from_env() -> i32 {
    let mut args = std::env::args();
    let program_name = args.next().unwrap_or_else(|| PROGRAM_NAME.to_string());
    let remaining: Vec<String> = args.collect();

    helpers::init_logging();

    match run_with_program_name(&program_name, remaining) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_iir_error();
            eprintln!("{}", diagnostic.diagnostic_line());
            eprintln!("{}", diagnostic.exit_line());
            diagnostic.exit_code()
        }
    }
}

fn run_with_program_name(program_name: &str, args: Vec<String>) -> Result<i32, CliError> {
    let alias = command_alias_from_program_name(program_name);
    let full_args = std::iter::once(PROGRAM_NAME.to_string())
        .chain(alias.map(str::to_string))
        .chain(args)
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn command_alias_from_program_name(program_name: &str) -> Option<&'static str> {
    let stem = std::path::Path::new(program_name)
        .file_stem()
        .and_then(|stem| stem.to_str())?;
    AGGREGATE_ALIASES
        .iter()
        .any(|alias| stem.eq_ignore_ascii_case(alias))
        .then_some("aggregate")
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "iirmaker",
    version,
    about = "Aggregate per-slot biquad coefficient files into a C initializer table",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<CliCommand>,

    #[command(flatten)]
    aggregate: commands::AggregateArgs,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Build outCoeffs.txt from the facuIn<outer><inner>.txt files (default)
    Aggregate(commands::AggregateArgs),
}

fn dispatch_parsed(cli: Cli) -> Result<i32, CliError> {
    match cli.command {
        Some(CliCommand::Aggregate(args)) => commands::run_aggregate_command(args),
        None => commands::run_aggregate_command(cli.aggregate),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(IirError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_iir_error(&self) -> IirError {
        match self {
            Self::Usage(message) => IirError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => IirError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
