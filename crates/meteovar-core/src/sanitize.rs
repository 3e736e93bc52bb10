//! Raw station table sanitization.
//!
//! Turns the string cells of an exported station table into a
//! [`FeatureMatrix`] indexed by reconstructed timestamps:
//!
//! 1. the unit-label row under the header is discarded,
//! 2. every cell is coerced to a number, unparseable cells become `None`,
//! 3. time fields and excluded columns are dropped,
//! 4. the configured [`MissingPolicy`] is applied.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::calendar::{matches_encoded_date, reconstruct_timestamp, CalendarConfig};
use crate::error::{Result, VarError};
use crate::imputation::MissingPolicy;
use crate::matrix::FeatureMatrix;

/// Encoding fields: hour-of-year, month, day, hour-of-day.
pub const TIME_COLUMNS: [&str; 4] = ["N", "M", "D", "H"];

const IRRADIANCE_ORIENTATIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
const IRRADIANCE_TILTS: [u32; 4] = [30, 45, 60, 90];

/// The 32 directional total-irradiance columns (8 orientations by 4 tilts).
pub fn directional_irradiance_columns() -> Vec<String> {
    IRRADIANCE_ORIENTATIONS
        .iter()
        .flat_map(|o| IRRADIANCE_TILTS.iter().map(move |t| format!("TI_{}_{}", o, t)))
        .collect()
}

/// Time fields followed by the directional irradiance fields.
pub fn default_excluded_columns() -> Vec<String> {
    TIME_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(directional_irradiance_columns())
        .collect()
}

/// Station table as exported: header, unit labels, then string rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub units: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Split records into header, unit row and data rows.
    ///
    /// Rows must all be as wide as the header.
    pub fn from_records(records: Vec<Vec<String>>) -> Result<Self> {
        let mut iter = records.into_iter();
        let header = iter
            .next()
            .ok_or_else(|| VarError::InvalidInput("table has no header row".to_string()))?;
        let units = iter.next().ok_or_else(|| {
            VarError::InvalidInput("table has no unit/metadata row".to_string())
        })?;
        let rows: Vec<Vec<String>> = iter.collect();

        let header: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != header.len() {
                return Err(VarError::InvalidInput(format!(
                    "data row {} has {} cells, header has {}",
                    i,
                    row.len(),
                    header.len()
                )));
            }
        }

        Ok(Self {
            header,
            units,
            rows,
        })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

/// Options for [`sanitize`].
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizeOptions {
    /// Columns removed before modeling. Time fields are always removed.
    pub excluded_columns: Vec<String>,
    pub missing_policy: MissingPolicy,
    pub calendar: CalendarConfig,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            excluded_columns: default_excluded_columns(),
            missing_policy: MissingPolicy::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

/// Sanitized matrix plus bookkeeping about what was recovered or removed.
#[derive(Debug, Clone)]
pub struct SanitizeOutcome {
    pub matrix: FeatureMatrix,
    /// Non-blank cells that failed numeric coercion.
    pub malformed_cells: usize,
    /// Rows removed by the `DropRows` policy.
    pub dropped_rows: usize,
    /// Rows whose M/D fields disagree with the reconstructed date.
    pub date_mismatches: usize,
}

/// Lenient numeric coercion: anything that is not a finite number is missing.
pub fn parse_cell(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strict numeric coercion reporting why a cell was rejected.
pub fn parse_cell_strict(raw: &str, column: &str, row: usize) -> Result<f64> {
    parse_cell(raw).ok_or_else(|| VarError::MalformedValue {
        column: column.to_string(),
        row,
        raw: raw.to_string(),
    })
}

fn parse_index_field(raw: &str, column: &str, row: usize) -> Result<u32> {
    let value = parse_cell_strict(raw, column, row)
        .map_err(|e| VarError::InvalidInput(format!("unusable time field: {}", e)))?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(VarError::InvalidInput(format!(
            "time field '{}' at row {} is not a non-negative integer: {}",
            column, row, raw
        )));
    }
    Ok(value as u32)
}

/// Coerce, index, reduce and clean a raw station table.
pub fn sanitize(table: &RawTable, options: &SanitizeOptions) -> Result<SanitizeOutcome> {
    options.calendar.validate()?;

    let n_idx = table
        .column_index("N")
        .ok_or_else(|| VarError::InvalidInput("missing hour-of-year column 'N'".to_string()))?;
    let h_idx = table
        .column_index("H")
        .ok_or_else(|| VarError::InvalidInput("missing hour-of-day column 'H'".to_string()))?;
    let md_idx = table.column_index("M").zip(table.column_index("D"));

    let mut excluded: HashSet<&str> = options
        .excluded_columns
        .iter()
        .map(String::as_str)
        .collect();
    for col in TIME_COLUMNS {
        excluded.insert(col);
    }
    let feature_idx: Vec<usize> = (0..table.header.len())
        .filter(|&i| !excluded.contains(table.header[i].as_str()))
        .collect();

    let mut index = Vec::with_capacity(table.rows.len());
    let mut columns: Vec<Vec<Option<f64>>> =
        vec![Vec::with_capacity(table.rows.len()); feature_idx.len()];
    let mut malformed_cells = 0;
    let mut date_mismatches = 0;
    let mut prev_hour: Option<u32> = None;

    for (row_no, row) in table.rows.iter().enumerate() {
        let n = parse_index_field(&row[n_idx], "N", row_no)?;
        let h = parse_index_field(&row[h_idx], "H", row_no)?;
        if let Some(prev) = prev_hour {
            if n < prev {
                return Err(VarError::InvalidInput(format!(
                    "hour-of-year decreases at row {}: {} after {}",
                    row_no, n, prev
                )));
            }
        }
        prev_hour = Some(n);

        let ts = reconstruct_timestamp(n, h, &options.calendar)?;
        if let Some((m_idx, d_idx)) = md_idx {
            if let (Some(m), Some(d)) = (parse_cell(&row[m_idx]), parse_cell(&row[d_idx])) {
                if !matches_encoded_date(&ts, m as u32, d as u32) {
                    date_mismatches += 1;
                }
            }
        }
        index.push(ts);

        for (col, &i) in columns.iter_mut().zip(feature_idx.iter()) {
            let value = parse_cell(&row[i]);
            if value.is_none() && !row[i].trim().is_empty() {
                malformed_cells += 1;
                debug!(
                    component = "sanitize",
                    event = "cell.malformed",
                    column = %table.header[i],
                    row = row_no,
                    raw = %row[i]
                );
            }
            col.push(value);
        }
    }

    if date_mismatches > 0 {
        warn!(
            component = "sanitize",
            event = "calendar.mismatch",
            rows = date_mismatches,
            "reconstructed dates disagree with the M/D fields"
        );
    }

    let names: Vec<String> = feature_idx
        .iter()
        .map(|&i| table.header[i].clone())
        .collect();
    let columns: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| options.missing_policy.fill_column(c))
        .collect();
    let matrix = FeatureMatrix::new(index, names, columns)?;

    let before = matrix.nrows();
    let matrix = match options.missing_policy {
        MissingPolicy::DropRows => matrix.drop_incomplete_rows(),
        _ => matrix,
    };
    let dropped_rows = before - matrix.nrows();

    info!(
        component = "sanitize",
        event = "table.sanitized",
        rows = matrix.nrows(),
        features = matrix.ncols(),
        malformed_cells,
        dropped_rows
    );

    Ok(SanitizeOutcome {
        matrix,
        malformed_cells,
        dropped_rows,
        date_mismatches,
    })
}
