//! Point-forecast accuracy metrics.
//!
//! | Metric | Use When |
//! |--------|----------|
//! | MAE | Need interpretable error in original units |
//! | MSE / RMSE | Want to penalize large errors more heavily |
//! | R² | Need explained variance proportion |
//! | Pearson | Checking whether two residual series move together |

use crate::error::{Result, VarError};
use crate::filter::{mean, sum_sq_dev};

/// Calculates Mean Absolute Error between actual and predicted values.
///
/// # Formula
/// MAE = (1/n) * Σ|actual_i - forecast_i|
///
/// # Example
/// ```
/// use meteovar_core::metrics::mae;
/// let actual = vec![1.0, 2.0, 3.0];
/// let forecast = vec![1.1, 2.2, 2.8];
/// let error = mae(&actual, &forecast).unwrap();
/// assert!((error - 0.166).abs() < 0.01);
/// ```
pub fn mae(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    validate_inputs(actual, forecast)?;
    let sum: f64 = actual
        .iter()
        .zip(forecast.iter())
        .map(|(a, f)| (a - f).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Calculates Mean Squared Error between actual and predicted values.
///
/// # Formula
/// MSE = (1/n) * Σ(actual_i - forecast_i)²
pub fn mse(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    validate_inputs(actual, forecast)?;
    let sum: f64 = actual
        .iter()
        .zip(forecast.iter())
        .map(|(a, f)| (a - f).powi(2))
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Root Mean Squared Error, in the units of the series.
pub fn rmse(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    Ok(mse(actual, forecast)?.sqrt())
}

/// R-squared (coefficient of determination).
///
/// Negative when the forecast does worse than the mean of `actual`. A
/// constant `actual` leaves R² undefined and is reported as degenerate.
pub fn r2(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    validate_inputs(actual, forecast)?;

    let ss_res: f64 = actual
        .iter()
        .zip(forecast.iter())
        .map(|(a, f)| (a - f).powi(2))
        .sum();
    let ss_tot = sum_sq_dev(actual);

    if ss_tot.abs() < f64::EPSILON {
        return Err(VarError::degenerate("actual"));
    }

    Ok(1.0 - ss_res / ss_tot)
}

/// Pearson correlation; `None` when either series has zero variance.
pub fn pearson(a: &[f64], b: &[f64]) -> Result<Option<f64>> {
    validate_inputs(a, b)?;
    let (ma, mb) = (mean(a), mean(b));
    let (ssa, ssb) = (sum_sq_dev(a), sum_sq_dev(b));
    if ssa < f64::EPSILON || ssb < f64::EPSILON {
        return Ok(None);
    }
    let cov: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - ma) * (y - mb))
        .sum();
    Ok(Some((cov / (ssa * ssb).sqrt()).clamp(-1.0, 1.0)))
}

fn validate_inputs(actual: &[f64], forecast: &[f64]) -> Result<()> {
    if actual.len() != forecast.len() {
        return Err(VarError::InvalidInput(format!(
            "Actual and forecast arrays must have the same length: {} vs {}",
            actual.len(),
            forecast.len()
        )));
    }
    if actual.is_empty() {
        return Err(VarError::InsufficientData { needed: 1, got: 0 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mae() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let forecast = vec![1.1, 2.2, 2.9, 4.1, 4.8];
        let result = mae(&actual, &forecast).unwrap();
        assert_relative_eq!(result, 0.14, epsilon = 0.01);
    }

    #[test]
    fn test_mse_and_rmse() {
        let actual = vec![1.0, 2.0, 3.0];
        let forecast = vec![1.0, 2.0, 4.0];
        assert_relative_eq!(mse(&actual, &forecast).unwrap(), 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(
            rmse(&actual, &forecast).unwrap(),
            (1.0_f64 / 3.0).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_r2_perfect_is_exactly_one() {
        let actual = vec![1.0, 2.5, 3.0, 4.75, 5.0];
        assert_eq!(r2(&actual, &actual).unwrap(), 1.0);
    }

    #[test]
    fn test_r2_can_be_negative() {
        let actual = vec![1.0, 2.0, 3.0];
        let forecast = vec![3.0, 2.0, 1.0];
        // ss_res = 8, ss_tot = 2
        assert_relative_eq!(r2(&actual, &forecast).unwrap(), -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_r2_constant_actual_is_degenerate() {
        let actual = vec![2.0, 2.0, 2.0];
        let forecast = vec![1.0, 2.0, 3.0];
        assert!(matches!(
            r2(&actual, &forecast),
            Err(VarError::DegenerateSeries { .. })
        ));
    }

    #[test]
    fn test_pearson() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b = vec![2.0, 4.0, 6.0, 8.0];
        let c = vec![4.0, 3.0, 2.0, 1.0];
        assert_relative_eq!(pearson(&a, &b).unwrap().unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson(&a, &c).unwrap().unwrap(), -1.0, epsilon = 1e-12);
        assert_eq!(pearson(&a, &[0.0; 4]).unwrap(), None);
    }

    #[test]
    fn test_validate_inputs_length_mismatch() {
        let actual = vec![1.0, 2.0, 3.0];
        let forecast = vec![1.0, 2.0];

        assert!(mae(&actual, &forecast).is_err());
        assert!(mse(&actual, &forecast).is_err());
    }

    #[test]
    fn test_validate_inputs_empty() {
        let actual: Vec<f64> = vec![];
        let forecast: Vec<f64> = vec![];

        assert!(matches!(
            mae(&actual, &forecast),
            Err(VarError::InsufficientData { needed: 1, got: 0 })
        ));
    }
}
