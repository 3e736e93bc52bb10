//! Deterministic fixtures for unit tests.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::matrix::FeatureMatrix;

/// Hourly keys starting at 2023-01-01 00:00.
pub fn hourly_index(n: usize) -> Vec<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n).map(|i| start + Duration::hours(i as i64)).collect()
}

/// Uniform noise in [-0.5, 0.5) from a 64-bit LCG.
pub fn uniform_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
        })
        .collect()
}

/// Simulate `y_t = c + Σ A_l y_{t−l} + e_t` with uniform shocks scaled by `scale`.
pub fn simulate_var(
    intercept: &[f64],
    lags: &[Vec<Vec<f64>>],
    n: usize,
    scale: f64,
    seed: u64,
) -> Vec<Vec<f64>> {
    let k = intercept.len();
    let burn_in = 200;
    let shocks: Vec<Vec<f64>> = (0..k)
        .map(|j| uniform_noise(n + burn_in, seed + j as u64))
        .collect();
    let mut rows: Vec<Vec<f64>> = vec![vec![0.0; k]; lags.len()];
    for t in 0..n + burn_in {
        let next: Vec<f64> = (0..k)
            .map(|eq| {
                let mut v = intercept[eq] + scale * shocks[eq][t];
                for (l, a) in lags.iter().enumerate() {
                    let past = &rows[rows.len() - 1 - l];
                    v += (0..k).map(|j| a[eq][j] * past[j]).sum::<f64>();
                }
                v
            })
            .collect();
        rows.push(next);
    }
    rows.split_off(rows.len() - n)
}

/// Complete matrix from dense rows with features named `x0, x1, …`.
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> FeatureMatrix {
    let k = rows.first().map(Vec::len).unwrap_or(0);
    let names = (0..k).map(|j| format!("x{}", j)).collect();
    let columns = (0..k)
        .map(|j| rows.iter().map(|r| r[j]).collect())
        .collect();
    FeatureMatrix::from_complete(hourly_index(rows.len()), names, columns).unwrap()
}
