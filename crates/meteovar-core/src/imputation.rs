//! Missing value handling for sanitized feature columns.

use serde::{Deserialize, Serialize};

/// What to do with missing cells before modeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Drop every row that has a missing cell in any retained column.
    #[default]
    DropRows,
    /// Carry the last observed value forward (LOCF).
    ForwardFill,
    /// Linear interpolation between observed neighbours.
    Interpolate,
    /// Leave missing cells in place for the caller to handle.
    Keep,
}

impl MissingPolicy {
    /// Apply a per-column policy. `DropRows` and `Keep` leave the column as is.
    pub fn fill_column(self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        match self {
            MissingPolicy::ForwardFill => fill_forward(values),
            MissingPolicy::Interpolate => fill_interpolate(values),
            MissingPolicy::DropRows | MissingPolicy::Keep => values.to_vec(),
        }
    }
}

/// Fill missing cells with the last observed value. Leading gaps stay missing.
pub fn fill_forward(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last_value: Option<f64> = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last_value = *v;
            }
            last_value
        })
        .collect()
}

/// Fill interior gaps by linear interpolation; edge gaps take the nearest observation.
///
/// A column with no observation at all stays entirely missing.
pub fn fill_interpolate(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let observed: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|x| (i, x)))
        .collect();

    let (Some(&(first, first_val)), Some(&(last, last_val))) = (observed.first(), observed.last())
    else {
        return values.to_vec();
    };

    let mut result: Vec<Option<f64>> = values.to_vec();
    for item in result.iter_mut().take(first) {
        *item = Some(first_val);
    }
    for item in result.iter_mut().skip(last + 1) {
        *item = Some(last_val);
    }

    for pair in observed.windows(2) {
        let (prev_idx, prev_val) = pair[0];
        let (next_idx, next_val) = pair[1];
        let gap = next_idx - prev_idx;
        if gap > 1 {
            let slope = (next_val - prev_val) / gap as f64;
            for j in 1..gap {
                result[prev_idx + j] = Some(prev_val + slope * j as f64);
            }
        }
    }

    result
}
