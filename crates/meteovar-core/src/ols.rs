//! Ordinary least squares with intercept, shared by the ADF and VAR fits.

use anofox_regression::prelude::*;
use faer::prelude::SolveLstsq;
use faer::{Col, Mat};

use crate::error::{Result, VarError};
use crate::filter::mean;

/// Coefficients and in-sample residuals of `y = a + X b + e`.
#[derive(Debug, Clone)]
pub(crate) struct LeastSquares {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    pub residuals: Vec<f64>,
}

impl LeastSquares {
    /// Residual sum of squares.
    pub fn rss(&self) -> f64 {
        self.residuals.iter().map(|e| e * e).sum()
    }
}

/// Build a design matrix (n_obs rows × n_regressors columns) from an element function.
pub(crate) fn design_matrix(
    nrows: usize,
    ncols: usize,
    f: impl Fn(usize, usize) -> f64,
) -> Mat<f64> {
    Mat::from_fn(nrows, ncols, f)
}

/// Fit OLS with intercept. A design without columns fits the mean.
pub(crate) fn fit_with_intercept(x: &Mat<f64>, y: &[f64]) -> Result<LeastSquares> {
    let n = y.len();
    if x.nrows() != n {
        return Err(VarError::InvalidInput(format!(
            "design has {} rows, response has {}",
            x.nrows(),
            n
        )));
    }
    if n == 0 {
        return Err(VarError::InsufficientData { needed: 1, got: 0 });
    }

    if x.ncols() == 0 {
        let m = mean(y);
        return Ok(LeastSquares {
            intercept: m,
            coefficients: vec![],
            residuals: y.iter().map(|v| v - m).collect(),
        });
    }

    let y_col = Col::from_fn(n, |i| y[i]);
    let fitted = OlsRegressor::builder()
        .with_intercept(true)
        .build()
        .fit(x, &y_col)
        .map_err(|_| VarError::Computation("least squares fit failed".to_string()))?;

    let intercept = fitted.intercept().unwrap_or(0.0);
    let coeffs_col = fitted.coefficients();
    // Aliased regressors come back non-finite; they carry no weight in the fit.
    let coefficients: Vec<f64> = (0..coeffs_col.nrows())
        .map(|i| coeffs_col[i])
        .map(|c| if c.is_finite() { c } else { 0.0 })
        .collect();

    let residuals: Vec<f64> = (0..n)
        .map(|i| {
            let fitted_value: f64 = intercept
                + coefficients
                    .iter()
                    .enumerate()
                    .map(|(j, b)| b * x[(i, j)])
                    .sum::<f64>();
            y[i] - fitted_value
        })
        .collect();

    if !intercept.is_finite() || residuals.iter().any(|e| !e.is_finite()) {
        return Err(VarError::Computation(
            "least squares fit produced non-finite values".to_string(),
        ));
    }

    Ok(LeastSquares {
        intercept,
        coefficients,
        residuals,
    })
}

// |R_ii| below this fraction of |R_00| marks a rank-deficient design
const RANK_TOLERANCE: f64 = 1e-10;

/// Fit several responses that share one design, factoring `[1 | X]` once.
///
/// Rank-deficient designs fall back to one [`fit_with_intercept`] per
/// response so aliased regressors are handled the same way.
pub(crate) fn fit_many_with_intercept(x: &Mat<f64>, ys: &[Vec<f64>]) -> Result<Vec<LeastSquares>> {
    let n = x.nrows();
    if let Some(y) = ys.iter().find(|y| y.len() != n) {
        return Err(VarError::InvalidInput(format!(
            "design has {} rows, response has {}",
            n,
            y.len()
        )));
    }
    let p = x.ncols() + 1;
    if ys.is_empty() || n < p {
        return ys.iter().map(|y| fit_with_intercept(x, y)).collect();
    }

    let design = Mat::from_fn(n, p, |i, j| if j == 0 { 1.0 } else { x[(i, j - 1)] });
    let qr = design.col_piv_qr();
    let r = qr.thin_R();
    let lead = r[(0, 0)].abs();
    if (0..p).any(|i| r[(i, i)].abs() <= RANK_TOLERANCE * lead) {
        return ys.iter().map(|y| fit_with_intercept(x, y)).collect();
    }

    let rhs = Mat::from_fn(n, ys.len(), |i, j| ys[j][i]);
    let beta = qr.solve_lstsq(&rhs);

    ys.iter()
        .enumerate()
        .map(|(eq, y)| {
            let intercept = beta[(0, eq)];
            let coefficients: Vec<f64> = (1..p).map(|j| beta[(j, eq)]).collect();
            let residuals: Vec<f64> = (0..n)
                .map(|i| {
                    let fitted_value: f64 = intercept
                        + coefficients
                            .iter()
                            .enumerate()
                            .map(|(j, b)| b * x[(i, j)])
                            .sum::<f64>();
                    y[i] - fitted_value
                })
                .collect();
            if !intercept.is_finite() || residuals.iter().any(|e| !e.is_finite()) {
                return Err(VarError::Computation(
                    "least squares fit produced non-finite values".to_string(),
                ));
            }
            Ok(LeastSquares {
                intercept,
                coefficients,
                residuals,
            })
        })
        .collect()
}
