//! Error types for the weather VAR pipeline.

use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, VarError>;

/// Error types for pipeline stages.
///
/// Missing cells are not errors: they travel through the pipeline as `None`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VarError {
    #[error("Malformed value in column '{column}' at row {row}: '{raw}'")]
    MalformedValue {
        column: String,
        row: usize,
        raw: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Degenerate series '{feature}': zero variance")]
    DegenerateSeries { feature: String },

    #[error("Invalid parameter '{param}' = '{value}': {reason}")]
    InvalidParameter {
        param: String,
        value: String,
        reason: String,
    },

    #[error("Computation error: {0}")]
    Computation(String),
}

impl VarError {
    /// Stable numeric code, used by the CLI as its exit status.
    pub fn code(&self) -> i32 {
        match self {
            VarError::MalformedValue { .. } => 1,
            VarError::InvalidInput(_) => 2,
            VarError::InsufficientData { .. } => 3,
            VarError::DegenerateSeries { .. } => 4,
            VarError::InvalidParameter { .. } => 5,
            VarError::Computation(_) => 6,
        }
    }

    pub(crate) fn degenerate(feature: impl Into<String>) -> Self {
        VarError::DegenerateSeries {
            feature: feature.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_unique() {
        let errors = [
            VarError::MalformedValue {
                column: "DBT".into(),
                row: 3,
                raw: "--".into(),
            },
            VarError::InvalidInput("x".into()),
            VarError::InsufficientData { needed: 10, got: 5 },
            VarError::degenerate("RH"),
            VarError::InvalidParameter {
                param: "max_lag".into(),
                value: "0".into(),
                reason: "must be positive".into(),
            },
            VarError::Computation("singular".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_error_display() {
        let err = VarError::InsufficientData { needed: 552, got: 40 };
        assert_eq!(
            format!("{}", err),
            "Insufficient data: need at least 552 observations, got 40"
        );

        let err = VarError::degenerate("WS");
        assert_eq!(format!("{}", err), "Degenerate series 'WS': zero variance");

        let err = VarError::MalformedValue {
            column: "DBT".into(),
            row: 7,
            raw: "n/a".into(),
        };
        assert_eq!(
            format!("{}", err),
            "Malformed value in column 'DBT' at row 7: 'n/a'"
        );

        let err = VarError::InvalidParameter {
            param: "significance".into(),
            value: "0.2".into(),
            reason: "must be one of 0.01, 0.05, 0.10".into(),
        };
        assert_eq!(
            format!("{}", err),
            "Invalid parameter 'significance' = '0.2': must be one of 0.01, 0.05, 0.10"
        );
    }

    #[test]
    fn test_insufficient_data_carries_needed_length() {
        let err = VarError::InsufficientData { needed: 5, got: 2 };
        if let VarError::InsufficientData { needed, got } = err {
            assert_eq!(needed, 5);
            assert_eq!(got, 2);
        } else {
            panic!("Expected InsufficientData variant");
        }
    }
}
