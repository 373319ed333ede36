use serde::Serialize;
use thiserror::Error;

/// Errors that stop an analysis before any regression is run. No results are produced
/// and any previously published snapshot is left as it was.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("Please enter a valid, positive number for the area (got {input:?}).")]
    InvalidArea { input: String },
    #[error("At least {required} valid data rows are required for a meaningful analysis, but only {valid} were found.")]
    InsufficientData { valid: usize, required: usize },
}

impl AnalysisError {
    pub(crate) fn invalid_area(input: &str) -> Self {
        Self::InvalidArea {
            input: input.to_string(),
        }
    }
}

/// An error raised when editing the observation table.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TableError {
    #[error("No observation row exists with id {0}")]
    UnknownRow(u64),
    #[error("The last remaining observation row cannot be removed")]
    LastRow,
}

/// Non-fatal conditions found while fitting the model. These travel alongside a valid
/// result set for display and never block the computation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Every total degree day value was identical, so the model was forced to zero.
    DegenerateModel,
    /// Weather explains very little of the variation in energy use.
    LowFit { r_squared: f64 },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::DegenerateModel => write!(
                f,
                "All degree day totals are identical; the model could not be fitted."
            ),
            Advisory::LowFit { r_squared } => write!(
                f,
                "Model has a very low R-Squared value ({r_squared:.3}). Results may not be reliable."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insufficient_data_message_names_counts() {
        let error = AnalysisError::InsufficientData {
            valid: 11,
            required: 12,
        };
        assert_eq!(
            error.to_string(),
            "At least 12 valid data rows are required for a meaningful analysis, but only 11 were found."
        );
    }

    #[test]
    fn test_advisory_serialises_with_kind_tag() {
        let json = serde_json::to_value(Advisory::LowFit { r_squared: 0.05 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "low_fit", "r_squared": 0.05}));
    }
}
