//! Pipeline configuration.
//!
//! Every field has a default, so a JSON document only needs the keys it
//! overrides:
//!
//! ```
//! use meteovar_core::config::PipelineConfig;
//! let config: PipelineConfig = serde_json::from_str(r#"{"max_lag": 10}"#).unwrap();
//! assert_eq!(config.max_lag, 10);
//! assert_eq!(config.horizon, 24);
//! ```

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarConfig;
use crate::error::{Result, VarError};
use crate::imputation::MissingPolicy;
use crate::sanitize::{default_excluded_columns, SanitizeOptions};
use crate::stationarity::{AdfOptions, SignificanceLevel};
use crate::var::DEFAULT_MAX_LAG;

pub const DEFAULT_TRAINING_WINDOW: usize = 5000;
pub const DEFAULT_HORIZON: usize = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Columns removed before modeling (time fields are always removed).
    pub excluded_columns: Vec<String>,
    /// Features entering the model; empty keeps every remaining column.
    pub tracked_features: Vec<String>,
    pub missing_policy: MissingPolicy,
    /// Lag-order ceiling for AIC selection.
    pub max_lag: usize,
    /// Rows `[0, training_window)` used for fitting.
    pub training_window: usize,
    /// Steps forecast past the training window and scored against the
    /// rows that follow it.
    pub horizon: usize,
    pub significance: SignificanceLevel,
    pub calendar: CalendarConfig,
    pub adf_max_lag: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            excluded_columns: default_excluded_columns(),
            tracked_features: Vec::new(),
            missing_policy: MissingPolicy::default(),
            max_lag: DEFAULT_MAX_LAG,
            training_window: DEFAULT_TRAINING_WINDOW,
            horizon: DEFAULT_HORIZON,
            significance: SignificanceLevel::default(),
            calendar: CalendarConfig::default(),
            adf_max_lag: None,
        }
    }
}

fn positive(param: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(VarError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        positive("max_lag", self.max_lag)?;
        positive("training_window", self.training_window)?;
        positive("horizon", self.horizon)?;
        self.calendar.validate()
    }

    pub fn sanitize_options(&self) -> SanitizeOptions {
        SanitizeOptions {
            excluded_columns: self.excluded_columns.clone(),
            missing_policy: self.missing_policy,
            calendar: self.calendar,
        }
    }

    pub fn adf_options(&self) -> AdfOptions {
        AdfOptions {
            max_lag: self.adf_max_lag,
            significance: self.significance,
        }
    }
}
