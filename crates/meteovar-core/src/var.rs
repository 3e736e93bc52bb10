//! Vector autoregression with AIC-driven lag-order selection.
//!
//! For a lag order `p` every feature at time `t` is modelled as
//!
//! ```text
//! y_t = c + A_1·y_{t−1} + … + A_p·y_{t−p} + u_t
//! ```
//!
//! and the `k` equations are estimated by least squares on a shared design.
//! Order selection fits every `p` in `1..=max_lag` independently, each on the
//! rows it can use (`t = p..n`), and keeps the order with the smallest
//!
//! ```text
//! AIC(p) = ln det Σ̂_u + 2·(p·k² + k) / (n − p)
//! ```
//!
//! where `Σ̂_u` is the maximum-likelihood residual covariance. Because the
//! score of an order does not depend on the ceiling, raising the ceiling can
//! only lower the best score found.

use faer::Mat;
use tracing::{debug, info, warn};

use crate::error::{Result, VarError};
use crate::matrix::FeatureMatrix;
use crate::ols::{design_matrix, fit_many_with_intercept};

pub const DEFAULT_MAX_LAG: usize = 50;

/// A fitted VAR(p).
#[derive(Debug, Clone, PartialEq)]
pub struct VarModel {
    feature_names: Vec<String>,
    order: usize,
    intercept: Vec<f64>,
    /// `lag_matrices[l][eq][var]` is the weight of `var` at lag `l + 1` in equation `eq`.
    lag_matrices: Vec<Vec<Vec<f64>>>,
    residual_covariance: Vec<Vec<f64>>,
    aic: f64,
    nobs: usize,
}

impl VarModel {
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn intercept(&self) -> &[f64] {
        &self.intercept
    }

    /// Coefficient matrix for lag `lag` (1-based), rows are equations.
    pub fn lag_matrix(&self, lag: usize) -> Option<&[Vec<f64>]> {
        lag.checked_sub(1)
            .and_then(|l| self.lag_matrices.get(l))
            .map(Vec::as_slice)
    }

    /// Maximum-likelihood residual covariance (divided by the observation count).
    pub fn residual_covariance(&self) -> &[Vec<f64>] {
        &self.residual_covariance
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Observations used in the fit (`n − p`).
    pub fn nobs(&self) -> usize {
        self.nobs
    }

    /// One-step prediction from the last `order` rows of `history`.
    ///
    /// The caller guarantees at least `order` rows of width `n_features`.
    pub(crate) fn predict_next(&self, history: &[Vec<f64>]) -> Vec<f64> {
        let len = history.len();
        (0..self.n_features())
            .map(|eq| {
                self.intercept[eq]
                    + self
                        .lag_matrices
                        .iter()
                        .enumerate()
                        .map(|(l, a)| {
                            let past = &history[len - 1 - l];
                            a[eq].iter().zip(past.iter()).map(|(w, v)| w * v).sum::<f64>()
                        })
                        .sum::<f64>()
            })
            .collect()
    }
}

/// AIC of every candidate order and the chosen one.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSelection {
    /// `(order, aic)` for every order that could be fitted, ascending by order.
    pub aic_by_order: Vec<(usize, f64)>,
    pub selected: usize,
}

impl OrderSelection {
    pub fn min_aic(&self) -> f64 {
        self.aic_by_order
            .iter()
            .find(|(p, _)| *p == self.selected)
            .map(|(_, aic)| *aic)
            .unwrap_or(f64::NAN)
    }
}

/// Selected model together with the search that produced it.
#[derive(Debug, Clone)]
pub struct SelectedVar {
    pub model: VarModel,
    pub selection: OrderSelection,
}

/// Shortest training window for which every order up to `max_lag` is estimable.
///
/// Order `p` leaves `n − p` rows for `p·k + 1` parameters per equation.
pub fn min_training_len(max_lag: usize, n_features: usize) -> usize {
    max_lag * n_features + max_lag + 2
}

/// Smallest AIC; ties keep the smaller order.
pub fn pick_min_aic(aic_by_order: &[(usize, f64)]) -> Option<(usize, f64)> {
    aic_by_order
        .iter()
        .copied()
        .filter(|(_, aic)| !aic.is_nan())
        .fold(None, |best, (p, aic)| match best {
            Some((_, best_aic)) if aic >= best_aic => best,
            _ => Some((p, aic)),
        })
}

fn validated_rows(matrix: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
    if matrix.ncols() == 0 {
        return Err(VarError::InvalidInput(
            "no tracked features to model".to_string(),
        ));
    }
    let rows = matrix.complete_rows()?;
    matrix.ensure_non_degenerate()?;
    Ok(rows)
}

fn check_lag(param: &str, lag: usize) -> Result<()> {
    if lag == 0 {
        return Err(VarError::InvalidParameter {
            param: param.to_string(),
            value: "0".to_string(),
            reason: "lag order must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Fit a VAR of a fixed order.
pub fn fit_var(matrix: &FeatureMatrix, order: usize) -> Result<VarModel> {
    check_lag("order", order)?;
    let rows = validated_rows(matrix)?;
    let needed = min_training_len(order, matrix.ncols());
    if rows.len() < needed {
        return Err(VarError::InsufficientData {
            needed,
            got: rows.len(),
        });
    }
    fit_order(&rows, matrix.names(), order)
}

/// Fit every order in `1..=max_lag` and keep the one with minimal AIC.
pub fn select_order(matrix: &FeatureMatrix, max_lag: usize) -> Result<SelectedVar> {
    check_lag("max_lag", max_lag)?;
    let rows = validated_rows(matrix)?;
    let needed = min_training_len(max_lag, matrix.ncols());
    if rows.len() < needed {
        return Err(VarError::InsufficientData {
            needed,
            got: rows.len(),
        });
    }

    // each order is an independent fit over the same rows
    let mut fitted: Vec<VarModel> = Vec::with_capacity(max_lag);
    let mut first_error: Option<VarError> = None;
    for p in 1..=max_lag {
        match fit_order(&rows, matrix.names(), p) {
            Ok(model) => {
                debug!(component = "var", event = "order.fitted", order = p, aic = model.aic);
                fitted.push(model);
            }
            Err(e) => {
                warn!(component = "var", event = "order.failed", order = p, error = %e);
                first_error.get_or_insert(e);
            }
        }
    }

    let aic_by_order: Vec<(usize, f64)> = fitted.iter().map(|m| (m.order, m.aic)).collect();
    let Some((selected, _)) = pick_min_aic(&aic_by_order) else {
        return Err(first_error.unwrap_or_else(|| {
            VarError::Computation("no lag order could be fitted".to_string())
        }));
    };
    let model = fitted
        .into_iter()
        .find(|m| m.order == selected)
        .ok_or_else(|| VarError::Computation(format!("selected order {} has no fitted model", selected)))?;

    info!(
        component = "var",
        event = "order.selected",
        order = model.order,
        aic = model.aic,
        candidates = aic_by_order.len(),
        features = model.n_features()
    );

    let selection = OrderSelection {
        selected,
        aic_by_order,
    };
    Ok(SelectedVar { model, selection })
}

/// Least squares VAR(p) on `rows[p..]`.
fn fit_order(rows: &[Vec<f64>], names: &[String], p: usize) -> Result<VarModel> {
    let n = rows.len();
    let k = names.len();
    let t_obs = n - p;

    // column l*k + j holds feature j at lag l + 1
    let x = design_matrix(t_obs, p * k, |i, col| {
        let lag = col / k + 1;
        rows[p + i - lag][col % k]
    });

    let mut intercept = Vec::with_capacity(k);
    let mut lag_matrices = vec![vec![vec![0.0; k]; k]; p];
    let mut residuals: Vec<Vec<f64>> = Vec::with_capacity(k);

    let responses: Vec<Vec<f64>> = (0..k)
        .map(|eq| rows[p..].iter().map(|r| r[eq]).collect())
        .collect();
    for (eq, fit) in fit_many_with_intercept(&x, &responses)?.into_iter().enumerate() {
        intercept.push(fit.intercept);
        for (col, &b) in fit.coefficients.iter().enumerate() {
            lag_matrices[col / k][eq][col % k] = b;
        }
        residuals.push(fit.residuals);
    }

    let residual_covariance: Vec<Vec<f64>> = (0..k)
        .map(|a| {
            (0..k)
                .map(|b| {
                    residuals[a]
                        .iter()
                        .zip(residuals[b].iter())
                        .map(|(u, v)| u * v)
                        .sum::<f64>()
                        / t_obs as f64
                })
                .collect()
        })
        .collect();

    let det = Mat::from_fn(k, k, |a, b| residual_covariance[a][b]).determinant();
    if !det.is_finite() || det <= 0.0 {
        return Err(VarError::Computation(format!(
            "residual covariance of VAR({}) is singular",
            p
        )));
    }

    let free_params = (p * k * k + k) as f64;
    let aic = det.ln() + 2.0 * free_params / t_obs as f64;

    Ok(VarModel {
        feature_names: names.to_vec(),
        order: p,
        intercept,
        lag_matrices,
        residual_covariance,
        aic,
        nobs: t_obs,
    })
}
