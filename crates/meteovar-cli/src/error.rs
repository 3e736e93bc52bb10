use std::path::PathBuf;

use meteovar_core::VarError;
use thiserror::Error;

use crate::observability::LoggingInitError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("usage: meteovar <table.csv> [config.json]")]
    Usage,
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Pipeline(#[from] VarError),
    #[error(transparent)]
    Logging(#[from] LoggingInitError),
}

impl CliError {
    /// Process exit code; pipeline failures keep the library's codes.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Pipeline(e) => e.code(),
            CliError::Usage => 64,
            CliError::Io { .. } | CliError::Csv(_) => 66,
            CliError::Config(_) => 78,
            CliError::Logging(_) => 70,
        }
    }
}
