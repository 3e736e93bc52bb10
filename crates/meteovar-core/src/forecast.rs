//! Multi-step forecasting with a fitted VAR.

use chrono::{Duration, NaiveDateTime};

use crate::error::{Result, VarError};
use crate::matrix::FeatureMatrix;
use crate::var::VarModel;

/// Forecast vectors aligned to the hours following the trailing window.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub feature_names: Vec<String>,
    /// One key per step: last observed key plus `h` hours.
    pub timestamps: Vec<NaiveDateTime>,
    /// `values[h][j]` is feature `j` at step `h + 1`.
    pub values: Vec<Vec<f64>>,
}

impl ForecastResult {
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Forecast path of one feature.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let j = self.feature_names.iter().position(|n| n == name)?;
        Some(self.values.iter().map(|row| row[j]).collect())
    }
}

/// Iterate the VAR recurrence `horizon` steps past the end of `history`.
///
/// `history` rows are observation vectors in model feature order; only the
/// last `order` rows are read. Forecasts feed back as lagged inputs and the
/// model is never refitted.
pub fn forecast_rows(
    model: &VarModel,
    history: &[Vec<f64>],
    horizon: usize,
) -> Result<Vec<Vec<f64>>> {
    let p = model.order();
    if history.len() < p {
        return Err(VarError::InsufficientData {
            needed: p,
            got: history.len(),
        });
    }
    if let Some(row) = history.iter().find(|r| r.len() != model.n_features()) {
        return Err(VarError::InvalidInput(format!(
            "history row has {} values, model tracks {} features",
            row.len(),
            model.n_features()
        )));
    }

    let mut buffer: Vec<Vec<f64>> = history[history.len() - p..].to_vec();
    let mut out = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        let next = model.predict_next(&buffer);
        buffer.remove(0);
        buffer.push(next.clone());
        out.push(next);
    }
    Ok(out)
}

/// Forecast from the trailing rows of a complete window with the model's features.
pub fn forecast(model: &VarModel, window: &FeatureMatrix, horizon: usize) -> Result<ForecastResult> {
    if window.names() != model.feature_names() {
        return Err(VarError::InvalidInput(format!(
            "window features {:?} do not match model features {:?}",
            window.names(),
            model.feature_names()
        )));
    }
    let rows = window.complete_rows()?;
    let values = forecast_rows(model, &rows, horizon)?;

    let origin = window.index().last().copied();
    let timestamps = match origin {
        Some(origin) => (1..=horizon)
            .map(|h| origin + Duration::hours(h as i64))
            .collect(),
        None => Vec::new(),
    };

    Ok(ForecastResult {
        feature_names: model.feature_names().to_vec(),
        timestamps,
        values,
    })
}
