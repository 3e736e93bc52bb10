//! Plain-text run summary printed on stdout.

use std::fmt;

use meteovar_core::PipelineOutcome;

/// Displays the verdicts, selected order, accuracy and residual correlation of a run.
pub struct Summary<'a>(pub &'a PipelineOutcome);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.0;
        let sanitized = &outcome.sanitized;
        writeln!(out, "== Data ==")?;
        writeln!(
            out,
            "rows: {}  features: {}  malformed cells: {}  dropped rows: {}  date mismatches: {}",
            sanitized.matrix.nrows(),
            outcome.tracked.ncols(),
            sanitized.malformed_cells,
            sanitized.dropped_rows,
            sanitized.date_mismatches
        )?;

        writeln!(out, "\n== Stationarity (ADF) ==")?;
        for screened in &outcome.verdicts {
            match &screened.outcome {
                Ok(v) => writeln!(
                    out,
                    "{:<12} stat={:>9.4} p={:.4} lags={:<3} 1%={:.3} 5%={:.3} 10%={:.3} -> {}",
                    v.feature,
                    v.statistic,
                    v.p_value,
                    v.used_lag,
                    v.critical_values.one_pct,
                    v.critical_values.five_pct,
                    v.critical_values.ten_pct,
                    if v.is_stationary { "stationary" } else { "non-stationary" }
                )?,
                Err(e) => writeln!(out, "{:<12} not screened: {}", screened.feature, e)?,
            }
        }

        let selection = &outcome.selected.selection;
        writeln!(out, "\n== Lag order ==")?;
        writeln!(
            out,
            "selected order: {} (AIC {:.4}, {} candidates)",
            selection.selected,
            selection.min_aic(),
            selection.aic_by_order.len()
        )?;

        writeln!(out, "\n== Forecast accuracy ({} steps) ==", outcome.forecast.horizon())?;
        for feature in &outcome.report.features {
            match &feature.outcome {
                Ok(m) => {
                    write!(
                        out,
                        "{:<12} MSE={:.4} MAE={:.4} RMSE={:.4} ",
                        feature.feature, m.mse, m.mae, m.rmse
                    )?;
                    match &m.r2 {
                        Ok(r2) => writeln!(out, "R2={:.4}", r2)?,
                        Err(_) => writeln!(out, "R2=undefined (constant realized values)")?,
                    }
                }
                Err(e) => writeln!(out, "{:<12} not scored: {}", feature.feature, e)?,
            }
        }

        writeln!(out, "\n== Residual correlation ==")?;
        let names = &outcome.forecast.feature_names;
        write!(out, "{:<12}", "")?;
        for name in names {
            write!(out, " {:>10}", name)?;
        }
        writeln!(out)?;
        for (name, row) in names.iter().zip(outcome.report.residual_correlation.iter()) {
            write!(out, "{:<12}", name)?;
            for value in row {
                write!(out, " {:>10.4}", value)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meteovar_core::{run, PipelineConfig, RawTable};

    fn table() -> RawTable {
        let mut records = vec![
            vec!["N".to_string(), "H".to_string(), "DBT".to_string(), "WS".to_string()],
            vec!["-".to_string(), "-".to_string(), "C".to_string(), "m/s".to_string()],
        ];
        for t in 0..160usize {
            let phase = 2.0 * std::f64::consts::PI * t as f64 / 24.0;
            let wobble = ((t * 37 + 11) % 17) as f64 / 17.0;
            let gust = ((t * 53 + 5) % 23) as f64 / 23.0;
            records.push(vec![
                (t + 1).to_string(),
                (t % 24).to_string(),
                format!("{:.3}", 18.0 + 4.0 * phase.sin() + 0.3 * wobble),
                format!("{:.3}", 3.0 + phase.cos() + 0.5 * gust),
            ]);
        }
        RawTable::from_records(records).unwrap()
    }

    #[test]
    fn summary_lists_every_section() {
        let config = PipelineConfig {
            max_lag: 3,
            training_window: 140,
            horizon: 12,
            ..PipelineConfig::default()
        };
        let outcome = run(&table(), &config).unwrap();
        let text = Summary(&outcome).to_string();

        for section in ["== Data ==", "== Stationarity (ADF) ==", "== Lag order ==", "== Residual correlation =="] {
            assert!(text.contains(section), "missing {}", section);
        }
        assert!(text.contains("Forecast accuracy (12 steps)"));
        assert!(text.contains(&format!("selected order: {}", outcome.selected.model.order())));
        assert!(text
            .lines()
            .any(|l| l.starts_with("DBT") && l.contains("MAE=") && l.contains("R2=")));
    }
}
