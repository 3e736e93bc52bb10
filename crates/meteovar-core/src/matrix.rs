//! Time-indexed feature matrix passed between pipeline stages.

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::error::{Result, VarError};
use crate::filter::is_constant;

/// Column-major feature matrix indexed by reconstructed hourly timestamps.
///
/// Missing cells are `None`. Every column has one entry per index key.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    index: Vec<NaiveDateTime>,
    names: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
}

impl FeatureMatrix {
    pub fn new(
        index: Vec<NaiveDateTime>,
        names: Vec<String>,
        columns: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(VarError::InvalidInput(format!(
                "{} column names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        if let Some((name, col)) = names
            .iter()
            .zip(columns.iter())
            .find(|(_, c)| c.len() != index.len())
        {
            return Err(VarError::InvalidInput(format!(
                "column '{}' has {} values, index has {}",
                name,
                col.len(),
                index.len()
            )));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(VarError::InvalidInput(format!(
                "duplicate column name '{}'",
                dup
            )));
        }
        let mut seen_keys = HashSet::new();
        if let Some(dup) = index.iter().find(|k| !seen_keys.insert(**k)) {
            return Err(VarError::InvalidInput(format!(
                "duplicate timestamp key {}",
                dup
            )));
        }

        Ok(Self {
            index,
            names,
            columns,
        })
    }

    /// Build a complete matrix from dense columns.
    pub fn from_complete(
        index: Vec<NaiveDateTime>,
        names: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let columns = columns
            .into_iter()
            .map(|c| c.into_iter().map(Some).collect())
            .collect();
        Self::new(index, names, columns)
    }

    pub fn nrows(&self) -> usize {
        self.index.len()
    }

    pub fn ncols(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[Vec<Option<f64>>] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.position(name).map(|i| self.columns[i].as_slice())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Number of missing cells per column, in column order.
    pub fn missing_counts(&self) -> Vec<usize> {
        self.columns
            .iter()
            .map(|c| c.iter().filter(|v| v.is_none()).count())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.columns.iter().all(|c| c.iter().all(Option::is_some))
    }

    /// Restrict to the named columns, in the given order.
    pub fn select(&self, names: &[String]) -> Result<Self> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let idx = self.position(name).ok_or_else(|| {
                VarError::InvalidInput(format!("unknown feature '{}'", name))
            })?;
            columns.push(self.columns[idx].clone());
        }
        Self::new(self.index.clone(), names.to_vec(), columns)
    }

    /// Contiguous row range `[start, start + len)`.
    pub fn window(&self, start: usize, len: usize) -> Result<Self> {
        let end = start.checked_add(len).unwrap_or(usize::MAX);
        if end > self.nrows() {
            return Err(VarError::InsufficientData {
                needed: end,
                got: self.nrows(),
            });
        }
        Ok(Self {
            index: self.index[start..end].to_vec(),
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| c[start..end].to_vec())
                .collect(),
        })
    }

    /// Remove every row with a missing cell in any column.
    pub fn drop_incomplete_rows(&self) -> Self {
        let keep: Vec<usize> = (0..self.nrows())
            .filter(|&i| self.columns.iter().all(|c| c[i].is_some()))
            .collect();
        Self {
            index: keep.iter().map(|&i| self.index[i]).collect(),
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| keep.iter().map(|&i| c[i]).collect())
                .collect(),
        }
    }

    /// Dense columns, failing if any cell is missing.
    pub fn complete_columns(&self) -> Result<Vec<Vec<f64>>> {
        self.names
            .iter()
            .zip(self.columns.iter())
            .map(|(name, col)| {
                col.iter()
                    .map(|v| {
                        v.ok_or_else(|| {
                            VarError::InvalidInput(format!(
                                "feature '{}' still contains missing values",
                                name
                            ))
                        })
                    })
                    .collect()
            })
            .collect()
    }

    /// Dense rows (one vector per timestamp), failing if any cell is missing.
    pub fn complete_rows(&self) -> Result<Vec<Vec<f64>>> {
        let columns = self.complete_columns()?;
        Ok((0..self.nrows())
            .map(|i| columns.iter().map(|c| c[i]).collect())
            .collect())
    }

    /// Fail with `DegenerateSeries` on the first constant column.
    pub fn ensure_non_degenerate(&self) -> Result<()> {
        for (name, col) in self.names.iter().zip(self.complete_columns()?.iter()) {
            if is_constant(col) {
                return Err(VarError::degenerate(name.as_str()));
            }
        }
        Ok(())
    }
}
