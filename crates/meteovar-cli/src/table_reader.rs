//! Loading of station tables and pipeline configuration from disk.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use meteovar_core::{PipelineConfig, RawTable};
use tracing::info;

use crate::error::CliError;

fn open(path: &Path) -> Result<File, CliError> {
    File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse CSV text: header record, unit record, then data records.
pub fn parse_table<R: Read>(reader: R) -> Result<RawTable, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect::<Vec<String>>());
    }
    Ok(RawTable::from_records(records)?)
}

pub fn read_table(path: &Path) -> Result<RawTable, CliError> {
    let table = parse_table(open(path)?)?;
    info!(
        component = "cli",
        event = "table.loaded",
        path = %path.display(),
        columns = table.header.len(),
        rows = table.rows.len()
    );
    Ok(table)
}

/// Load a JSON configuration; keys that are absent keep their defaults.
pub fn read_config(path: &Path) -> Result<PipelineConfig, CliError> {
    let config: PipelineConfig = serde_json::from_reader(open(path)?)?;
    config.validate()?;
    Ok(config)
}
