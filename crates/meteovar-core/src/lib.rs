//! Core library for hourly weather-station VAR forecasting.
//!
//! Turns a raw station table into a cleaned, timestamped feature matrix,
//! screens each feature for a unit root, fits a vector autoregression with
//! AIC lag selection, forecasts past the training window and scores the
//! forecast against the realized hours.

pub mod calendar;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod filter;
pub mod forecast;
pub mod imputation;
pub mod matrix;
pub mod metrics;
mod ols;
pub mod pipeline;
pub mod sanitize;
pub mod stationarity;
pub mod var;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use calendar::{hour_of_year, reconstruct_timestamp, CalendarConfig};
pub use config::PipelineConfig;
pub use error::{Result, VarError};
pub use evaluation::{evaluate, evaluate_rows, EvaluationReport, FeatureEvaluation, FeatureMetrics};
pub use filter::{diff, is_constant};
pub use forecast::{forecast, forecast_rows, ForecastResult};
pub use imputation::{fill_forward, fill_interpolate, MissingPolicy};
pub use matrix::FeatureMatrix;
pub use metrics::{mae, mse, pearson, r2, rmse};
pub use pipeline::{run, PipelineOutcome};
pub use sanitize::{
    default_excluded_columns, directional_irradiance_columns, parse_cell, sanitize, RawTable,
    SanitizeOptions, SanitizeOutcome,
};
pub use stationarity::{
    adf_test, screen_matrix, AdfOptions, CriticalValues, ScreenedFeature, SignificanceLevel,
    StationarityVerdict,
};
pub use var::{fit_var, select_order, OrderSelection, SelectedVar, VarModel};
