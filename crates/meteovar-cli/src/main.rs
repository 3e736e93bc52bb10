//! `meteovar <table.csv> [config.json]`
//!
//! Runs the forecasting pipeline on a station table and prints a summary.
//! Logging is configured through `METEOVAR_LOG_LEVEL` and `METEOVAR_LOG_FORMAT`
//! (`pretty` or `json`).

mod error;
mod observability;
mod summary;
mod table_reader;

use std::path::PathBuf;
use std::process::ExitCode;

use meteovar_core::{run, PipelineConfig};
use tracing::error;

use crate::error::CliError;
use crate::observability::{init_logging, log_run_start, LoggingConfig};
use crate::summary::Summary;
use crate::table_reader::{read_config, read_table};

struct Args {
    table: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, CliError> {
    let table = args.next().ok_or(CliError::Usage)?;
    let config = args.next();
    if args.next().is_some() || table == "-h" || table == "--help" {
        return Err(CliError::Usage);
    }
    Ok(Args {
        table: PathBuf::from(table),
        config: config.map(PathBuf::from),
    })
}

fn try_main() -> Result<(), CliError> {
    let args = parse_args(std::env::args().skip(1))?;
    init_logging(&LoggingConfig::from_env())?;
    log_run_start(&args.table, args.config.as_deref());

    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => PipelineConfig::default(),
    };
    let table = read_table(&args.table)?;
    let outcome = run(&table, &config)?;
    print!("{}", Summary(&outcome));
    Ok(())
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(component = "cli", event = "run.failed", error = %err);
            eprintln!("meteovar: {}", err);
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}
