//! Logging configuration and initialization.

use std::path::Path;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub const LEVEL_VAR: &str = "METEOVAR_LOG_LEVEL";
pub const FORMAT_VAR: &str = "METEOVAR_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `meteovar_core=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Build from variable lookups; blank or unknown values keep the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let level = lookup(LEVEL_VAR)
            .map(|raw| raw.trim().to_string())
            .filter(|level| !level.is_empty())
            .unwrap_or(default.level);
        let format = lookup(FORMAT_VAR)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(default.format);
        Self { level, format }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

#[derive(Debug, Error)]
pub enum LoggingInitError {
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber on stderr; stdout carries only the summary.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.with_ansi(false).json().finish())?
        }
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish())?,
    }
    Ok(())
}

pub fn log_run_start(table: &Path, config_path: Option<&Path>) {
    info!(
        component = "cli",
        event = "run.start",
        table = %table.display(),
        config = ?config_path.map(Path::display)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> LoggingConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LoggingConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config_from(&[]), LoggingConfig::default());
    }

    #[test]
    fn reads_level_and_format() {
        let cfg = config_from(&[(LEVEL_VAR, "meteovar_core=debug"), (FORMAT_VAR, " JSON ")]);
        assert_eq!(cfg.level, "meteovar_core=debug");
        assert_eq!(cfg.format, LogFormat::Json);
    }

    #[test]
    fn blank_or_unknown_values_keep_defaults() {
        let cfg = config_from(&[(LEVEL_VAR, "   "), (FORMAT_VAR, "xml")]);
        assert_eq!(cfg, LoggingConfig::default());
    }
}
