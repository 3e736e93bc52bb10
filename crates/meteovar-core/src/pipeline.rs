//! End-to-end run: sanitize, screen, fit, forecast, score.

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{Result, VarError};
use crate::evaluation::{evaluate_rows, EvaluationReport};
use crate::forecast::{forecast, ForecastResult};
use crate::matrix::FeatureMatrix;
use crate::sanitize::{sanitize, RawTable, SanitizeOutcome};
use crate::stationarity::{screen_matrix, ScreenedFeature};
use crate::var::{select_order, SelectedVar};

/// Everything one run produces, kept in memory for the caller.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub sanitized: SanitizeOutcome,
    /// Tracked feature matrix the model was fitted on (all rows).
    pub tracked: FeatureMatrix,
    pub verdicts: Vec<ScreenedFeature>,
    pub selected: SelectedVar,
    pub forecast: ForecastResult,
    pub report: EvaluationReport,
}

fn tracked_matrix(matrix: &FeatureMatrix, config: &PipelineConfig) -> Result<FeatureMatrix> {
    if config.tracked_features.is_empty() {
        Ok(matrix.clone())
    } else {
        matrix.select(&config.tracked_features)
    }
}

/// Run the full pipeline on a raw station table.
///
/// The model is fitted on rows `[0, training_window)` and its forecast for
/// the next `horizon` hours is scored against rows
/// `[training_window, training_window + horizon)`. Stationarity verdicts are
/// computed for every tracked feature but do not filter the model inputs.
pub fn run(table: &RawTable, config: &PipelineConfig) -> Result<PipelineOutcome> {
    config.validate()?;

    let sanitized = sanitize(table, &config.sanitize_options())?;
    let tracked = tracked_matrix(&sanitized.matrix, config)?;
    if tracked.ncols() == 0 {
        return Err(VarError::InvalidInput(
            "no features left to model after exclusions".to_string(),
        ));
    }
    info!(
        component = "pipeline",
        event = "features.tracked",
        features = tracked.ncols(),
        rows = tracked.nrows()
    );

    let verdicts = screen_matrix(&tracked, &config.adf_options());
    let stationary = verdicts
        .iter()
        .filter(|v| matches!(&v.outcome, Ok(verdict) if verdict.is_stationary))
        .count();
    info!(
        component = "pipeline",
        event = "screening.done",
        screened = verdicts.len(),
        stationary
    );

    let needed = config.training_window + config.horizon;
    if tracked.nrows() < needed {
        return Err(VarError::InsufficientData {
            needed,
            got: tracked.nrows(),
        });
    }
    let training = tracked.window(0, config.training_window)?;
    let holdout = tracked.window(config.training_window, config.horizon)?;

    let selected = select_order(&training, config.max_lag)?;
    info!(
        component = "pipeline",
        event = "order.selected",
        order = selected.model.order(),
        aic = selected.model.aic()
    );

    let forecast = forecast(&selected.model, &training, config.horizon)?;
    if forecast.timestamps.as_slice() != holdout.index() {
        // dropped rows or wraparound break the hourly spacing; score by position
        warn!(
            component = "pipeline",
            event = "holdout.misaligned",
            horizon = config.horizon
        );
    }
    let report = evaluate_rows(
        &forecast.feature_names,
        &forecast.values,
        &holdout.complete_rows()?,
    )?;

    Ok(PipelineOutcome {
        sanitized,
        tracked,
        verdicts,
        selected,
        forecast,
        report,
    })
}
