//! Scoring of forecasts against the realized continuation.

use tracing::{info, warn};

use crate::error::{Result, VarError};
use crate::forecast::ForecastResult;
use crate::matrix::FeatureMatrix;
use crate::metrics::{mae, mse, pearson, r2};

/// Accuracy of one feature's forecast path.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMetrics {
    pub mse: f64,
    pub mae: f64,
    pub rmse: f64,
    /// Undefined (`DegenerateSeries`) when the realized values are constant.
    pub r2: Result<f64>,
}

/// Per-feature outcome; a degenerate feature does not stop the others.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEvaluation {
    pub feature: String,
    pub outcome: Result<FeatureMetrics>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub features: Vec<FeatureEvaluation>,
    /// Pearson correlation of residual series, in feature order.
    ///
    /// Symmetric with a unit diagonal; pairs involving a constant residual
    /// series are 0.0.
    pub residual_correlation: Vec<Vec<f64>>,
}

impl EvaluationReport {
    pub fn metrics(&self, feature: &str) -> Option<&Result<FeatureMetrics>> {
        self.features
            .iter()
            .find(|f| f.feature == feature)
            .map(|f| &f.outcome)
    }
}

fn score_feature(feature: &str, actual: &[f64], predicted: &[f64]) -> Result<FeatureMetrics> {
    let mse = mse(actual, predicted)?;
    let r2 = r2(actual, predicted).map_err(|e| match e {
        VarError::DegenerateSeries { .. } => VarError::degenerate(feature),
        other => other,
    });
    Ok(FeatureMetrics {
        mse,
        mae: mae(actual, predicted)?,
        rmse: mse.sqrt(),
        r2,
    })
}

/// Score forecast rows against realized rows (`rows[h][feature]`).
pub fn evaluate_rows(
    feature_names: &[String],
    predicted: &[Vec<f64>],
    actual: &[Vec<f64>],
) -> Result<EvaluationReport> {
    if predicted.len() != actual.len() {
        return Err(VarError::InvalidInput(format!(
            "forecast has {} steps, realized values have {}",
            predicted.len(),
            actual.len()
        )));
    }
    if predicted.is_empty() {
        return Err(VarError::InsufficientData { needed: 1, got: 0 });
    }
    let k = feature_names.len();
    if let Some(row) = predicted.iter().chain(actual.iter()).find(|r| r.len() != k) {
        return Err(VarError::InvalidInput(format!(
            "row has {} values for {} features",
            row.len(),
            k
        )));
    }

    let column = |rows: &[Vec<f64>], j: usize| -> Vec<f64> { rows.iter().map(|r| r[j]).collect() };

    let mut features = Vec::with_capacity(k);
    let mut residuals = Vec::with_capacity(k);
    for (j, name) in feature_names.iter().enumerate() {
        let a = column(actual, j);
        let p = column(predicted, j);
        let outcome = score_feature(name, &a, &p);
        match &outcome {
            Err(e) => {
                warn!(component = "evaluation", event = "feature.unscored", feature = %name, error = %e)
            }
            Ok(FeatureMetrics { r2: Err(e), .. }) => {
                warn!(component = "evaluation", event = "feature.r2_undefined", feature = %name, error = %e)
            }
            Ok(_) => {}
        }
        features.push(FeatureEvaluation {
            feature: name.clone(),
            outcome,
        });
        residuals.push(a.iter().zip(p.iter()).map(|(x, y)| x - y).collect::<Vec<f64>>());
    }

    let mut residual_correlation = vec![vec![0.0; k]; k];
    for i in 0..k {
        residual_correlation[i][i] = 1.0;
        for j in (i + 1)..k {
            let r = pearson(&residuals[i], &residuals[j])?.unwrap_or(0.0);
            residual_correlation[i][j] = r;
            residual_correlation[j][i] = r;
        }
    }

    info!(
        component = "evaluation",
        event = "forecast.scored",
        horizon = predicted.len(),
        features = k,
        unscored = features.iter().filter(|f| f.outcome.is_err()).count()
    );

    Ok(EvaluationReport {
        features,
        residual_correlation,
    })
}

/// Score a forecast against the realized window covering the same hours.
pub fn evaluate(forecast: &ForecastResult, realized: &FeatureMatrix) -> Result<EvaluationReport> {
    if realized.names() != forecast.feature_names.as_slice() {
        return Err(VarError::InvalidInput(format!(
            "realized features {:?} do not match forecast features {:?}",
            realized.names(),
            forecast.feature_names
        )));
    }
    if !forecast.timestamps.is_empty() && forecast.timestamps.as_slice() != realized.index() {
        return Err(VarError::InvalidInput(
            "realized window is not aligned with the forecast timestamps".to_string(),
        ));
    }
    let actual = realized.complete_rows()?;
    evaluate_rows(&forecast.feature_names, &forecast.values, &actual)
}
