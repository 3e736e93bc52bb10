//! Unit-root screening of feature series.
//!
//! Runs the augmented Dickey-Fuller test with a constant term:
//!
//! ```text
//! Δy_t = α + β·y_{t−1} + Σ_{i=1..q} γ_i·Δy_{t−i} + ε_t
//! ```
//!
//! The augmentation order `q` is chosen by AIC on a common sample, the
//! statistic is `β̂ / se(β̂)`, critical values come from the MacKinnon (2010)
//! response surface and p-values from the MacKinnon (1994) approximation.
//!
//! The verdict is advisory: it does not decide which series enter the model.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

use crate::error::{Result, VarError};
use crate::filter::{diff, is_constant, sum_sq_dev};
use crate::matrix::FeatureMatrix;
use crate::ols::{design_matrix, fit_with_intercept};

/// Shortest series the test accepts.
pub const MIN_OBSERVATIONS: usize = 8;

// MacKinnon (2010), constant only, one variable: b0 + b1/T + b2/T^2 + b3/T^3
const CRIT_1PCT: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const CRIT_5PCT: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const CRIT_10PCT: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

// MacKinnon (1994) p-value surface, constant only, one variable
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// Significance level used to classify a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignificanceLevel {
    #[serde(rename = "1%")]
    OnePercent,
    #[default]
    #[serde(rename = "5%")]
    FivePercent,
    #[serde(rename = "10%")]
    TenPercent,
}

impl SignificanceLevel {
    pub fn alpha(self) -> f64 {
        match self {
            SignificanceLevel::OnePercent => 0.01,
            SignificanceLevel::FivePercent => 0.05,
            SignificanceLevel::TenPercent => 0.10,
        }
    }
}

/// Critical values of the test statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

impl CriticalValues {
    /// Response-surface critical values for a regression with `nobs` observations.
    pub fn for_observations(nobs: usize) -> Self {
        let surface = |b: &[f64; 4]| {
            let t = nobs as f64;
            b[0] + b[1] / t + b[2] / (t * t) + b[3] / (t * t * t)
        };
        Self {
            one_pct: surface(&CRIT_1PCT),
            five_pct: surface(&CRIT_5PCT),
            ten_pct: surface(&CRIT_10PCT),
        }
    }

    pub fn at(&self, level: SignificanceLevel) -> f64 {
        match level {
            SignificanceLevel::OnePercent => self.one_pct,
            SignificanceLevel::FivePercent => self.five_pct,
            SignificanceLevel::TenPercent => self.ten_pct,
        }
    }
}

/// Outcome of one screening pass over one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct StationarityVerdict {
    pub feature: String,
    pub statistic: f64,
    pub p_value: f64,
    /// Augmentation lags `q` selected by AIC.
    pub used_lag: usize,
    /// Observations in the final regression.
    pub nobs: usize,
    pub critical_values: CriticalValues,
    pub significance: SignificanceLevel,
    pub is_stationary: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdfOptions {
    /// Largest augmentation order tried; `None` uses `12·(n/100)^(1/4)`.
    pub max_lag: Option<usize>,
    pub significance: SignificanceLevel,
}

/// Approximate p-value for an ADF statistic (constant, no trend).
pub fn mackinnon_p_value(statistic: f64) -> Result<f64> {
    if statistic > TAU_MAX {
        return Ok(1.0);
    }
    if statistic < TAU_MIN {
        return Ok(0.0);
    }
    let coeffs: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    let z = coeffs
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * statistic + c);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| VarError::Computation(format!("normal distribution: {}", e)))?;
    Ok(normal.cdf(z))
}

/// Default largest augmentation order, capped so the regression stays estimable.
fn default_max_lag(n: usize) -> usize {
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    schwert.min(cap_max_lag(n))
}

fn cap_max_lag(n: usize) -> usize {
    (n / 2).saturating_sub(2)
}

/// ADF regression on rows `start..dy.len()` with `q` lagged differences.
///
/// Returns the level coefficient, its standard error and the residual sum of squares.
fn adf_regression(y: &[f64], dy: &[f64], start: usize, q: usize) -> Result<(f64, f64, f64)> {
    let rows = dy.len() - start;
    let response: Vec<f64> = dy[start..].to_vec();

    // column 0 is the lagged level, columns 1..=q the lagged differences
    let full = design_matrix(rows, q + 1, |i, j| {
        let t = start + i;
        if j == 0 {
            y[t]
        } else {
            dy[t - j]
        }
    });
    let fit = fit_with_intercept(&full, &response)?;
    let beta = fit.coefficients[0];
    let rss = fit.rss();

    // Frisch-Waugh-Lovell: partial the other regressors out of the level
    let others = design_matrix(rows, q, |i, j| dy[start + i - (j + 1)]);
    let level: Vec<f64> = (start..dy.len()).map(|t| y[t]).collect();
    let level_resid = fit_with_intercept(&others, &level)?.rss();

    let dof = rows as f64 - (q + 2) as f64;
    let sigma_sq = rss / dof;
    let se = (sigma_sq / level_resid).sqrt();
    Ok((beta, se, rss))
}

/// Augmented Dickey-Fuller test on one complete feature series.
pub fn adf_test(
    feature: &str,
    series: &[Option<f64>],
    options: &AdfOptions,
) -> Result<StationarityVerdict> {
    let y: Vec<f64> = series
        .iter()
        .map(|v| {
            v.ok_or_else(|| {
                VarError::InvalidInput(format!(
                    "feature '{}' contains missing values; clean before screening",
                    feature
                ))
            })
        })
        .collect::<Result<_>>()?;

    let n = y.len();
    if n < MIN_OBSERVATIONS {
        return Err(VarError::InsufficientData {
            needed: MIN_OBSERVATIONS,
            got: n,
        });
    }
    if is_constant(&y) || sum_sq_dev(&y) < f64::EPSILON {
        return Err(VarError::degenerate(feature));
    }

    let max_lag = options
        .max_lag
        .map(|m| m.min(cap_max_lag(n)))
        .unwrap_or_else(|| default_max_lag(n));
    let dy = diff(&y);

    // Lag search on the common sample starting at max_lag
    let common_rows = (dy.len() - max_lag) as f64;
    let mut best_lag = 0;
    let mut best_aic = f64::INFINITY;
    for q in 0..=max_lag {
        let (_, _, rss) = adf_regression(&y, &dy, max_lag, q)?;
        let aic = common_rows * (rss / common_rows).ln() + 2.0 * (q + 2) as f64;
        if aic < best_aic {
            best_aic = aic;
            best_lag = q;
        }
    }

    let (beta, se, _) = adf_regression(&y, &dy, best_lag, best_lag)?;
    if !se.is_finite() || se <= 0.0 {
        return Err(VarError::Computation(format!(
            "standard error of the level coefficient for '{}' is not positive",
            feature
        )));
    }

    let statistic = beta / se;
    let nobs = dy.len() - best_lag;
    let critical_values = CriticalValues::for_observations(nobs);
    let p_value = mackinnon_p_value(statistic)?;
    let is_stationary = statistic < critical_values.at(options.significance);

    debug!(
        component = "stationarity",
        event = "adf.done",
        feature,
        statistic,
        p_value,
        used_lag = best_lag,
        is_stationary
    );

    Ok(StationarityVerdict {
        feature: feature.to_string(),
        statistic,
        p_value,
        used_lag: best_lag,
        nobs,
        critical_values,
        significance: options.significance,
        is_stationary,
    })
}

/// Screening outcome for one column; failures stay local to their feature.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenedFeature {
    pub feature: String,
    pub outcome: Result<StationarityVerdict>,
}

/// Screen every column of a matrix.
pub fn screen_matrix(matrix: &FeatureMatrix, options: &AdfOptions) -> Vec<ScreenedFeature> {
    matrix
        .names()
        .iter()
        .zip(matrix.columns().iter())
        .map(|(name, col)| {
            let outcome = adf_test(name, col, options);
            if let Err(e) = &outcome {
                warn!(
                    component = "stationarity",
                    event = "adf.failed",
                    feature = %name,
                    error = %e
                );
            }
            ScreenedFeature {
                feature: name.clone(),
                outcome,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{hourly_index, uniform_noise};
    use approx::assert_relative_eq;

    fn noise(n: usize) -> Vec<Option<f64>> {
        uniform_noise(n, 42).into_iter().map(Some).collect()
    }

    #[test]
    fn test_white_noise_is_stationary() {
        let verdict = adf_test("noise", &noise(300), &AdfOptions::default()).unwrap();
        assert!(verdict.is_stationary);
        assert!(verdict.statistic < verdict.critical_values.five_pct);
        assert!(verdict.p_value < 0.05);
    }

    #[test]
    fn test_trending_series_is_not_stationary() {
        let series: Vec<Option<f64>> = uniform_noise(300, 7)
            .into_iter()
            .enumerate()
            .map(|(i, e)| Some(i as f64 * 0.5 + e))
            .collect();
        let verdict = adf_test("trend", &series, &AdfOptions::default()).unwrap();
        assert!(!verdict.is_stationary);
    }

    #[test]
    fn test_random_walk_is_not_stationary() {
        for seed in 1..=5u64 {
            let mut level = 0.0;
            let walk: Vec<Option<f64>> = uniform_noise(2000, seed)
                .into_iter()
                .map(|step| {
                    level += step;
                    Some(level)
                })
                .collect();
            let verdict = adf_test("walk", &walk, &AdfOptions::default()).unwrap();
            assert!(!verdict.is_stationary, "seed {} flagged stationary", seed);
            assert!(verdict.p_value > 0.05, "seed {} p = {}", seed, verdict.p_value);
        }
    }

    #[test]
    fn test_default_max_lag_rounds_up() {
        assert_eq!(default_max_lag(100), 12);
        assert_eq!(default_max_lag(5000), 32);
        // 12 * 0.2^0.25 rounds up to 9, then the sample cap of 8 applies
        assert_eq!(default_max_lag(20), 8);
    }

    #[test]
    fn test_critical_values_ordering_and_asymptotics() {
        let cv = CriticalValues::for_observations(500);
        assert!(cv.one_pct < cv.five_pct);
        assert!(cv.five_pct < cv.ten_pct);
        assert_relative_eq!(cv.five_pct, -2.8673, epsilon = 1e-3);

        let large = CriticalValues::for_observations(1_000_000);
        assert_relative_eq!(large.one_pct, -3.43035, epsilon = 1e-4);
    }

    #[test]
    fn test_p_value_bounds_and_calibration() {
        assert_eq!(mackinnon_p_value(3.0).unwrap(), 1.0);
        assert_eq!(mackinnon_p_value(-25.0).unwrap(), 0.0);
        // the asymptotic 5% critical value maps to roughly p = 0.05
        assert_relative_eq!(mackinnon_p_value(-2.86154).unwrap(), 0.05, epsilon = 0.005);
        let mut prev = 0.0;
        for k in 0..40 {
            let p = mackinnon_p_value(-6.0 + 0.2 * k as f64).unwrap();
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= prev);
            prev = p;
        }
    }

    #[test]
    fn test_significance_level_changes_threshold() {
        let options = AdfOptions {
            significance: SignificanceLevel::OnePercent,
            ..Default::default()
        };
        let verdict = adf_test("noise", &noise(300), &options).unwrap();
        assert_eq!(verdict.significance, SignificanceLevel::OnePercent);
        assert_eq!(
            verdict.is_stationary,
            verdict.statistic < verdict.critical_values.one_pct
        );
    }

    #[test]
    fn test_missing_values_are_invalid_input() {
        let mut series = noise(50);
        series[10] = None;
        assert!(matches!(
            adf_test("dbt", &series, &AdfOptions::default()),
            Err(VarError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_constant_series_is_degenerate() {
        let series = vec![Some(101.3); 100];
        assert_eq!(
            adf_test("ATM", &series, &AdfOptions::default()),
            Err(VarError::DegenerateSeries {
                feature: "ATM".into()
            })
        );
    }

    #[test]
    fn test_short_series() {
        assert!(matches!(
            adf_test("x", &noise(5), &AdfOptions::default()),
            Err(VarError::InsufficientData { needed: 8, got: 5 })
        ));
    }

    #[test]
    fn test_fixed_max_lag_is_respected() {
        let options = AdfOptions {
            max_lag: Some(2),
            ..Default::default()
        };
        let verdict = adf_test("noise", &noise(200), &options).unwrap();
        assert!(verdict.used_lag <= 2);
        assert_eq!(verdict.nobs, 199 - verdict.used_lag);
    }

    #[test]
    fn test_screen_matrix_isolates_failures() {
        let matrix = FeatureMatrix::new(
            hourly_index(120),
            vec!["DBT".into(), "ATM".into()],
            vec![noise(120), vec![Some(101.3); 120]],
        )
        .unwrap();

        let screened = screen_matrix(&matrix, &AdfOptions::default());
        assert_eq!(screened.len(), 2);
        assert!(screened[0].outcome.is_ok());
        assert!(matches!(
            screened[1].outcome,
            Err(VarError::DegenerateSeries { .. })
        ));
    }
}
