//! Unified error hierarchy for planrs
//!
//! All errors are raised during the validation and derivation stages, before
//! any plan is assembled. Generation is all-or-nothing: a failed run never
//! returns a partial plan.

use chrono::NaiveDate;
use thiserror::Error;

/// Top-level error type for plan generation
#[derive(Debug, Error)]
pub enum PlanError {
    /// Malformed or out-of-range input value
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Plan window shorter than the minimum lead time for the goal distance
    #[error(
        "Insufficient time window: {available_weeks} weeks available, \
         {required_weeks} required for this goal distance"
    )]
    InsufficientTimeWindow {
        available_weeks: u32,
        required_weeks: u32,
    },

    /// Reference/goal distance ratio outside the pace model's validated range
    #[error("Unsupported extrapolation: distance ratio {ratio:.2} outside [{min:.2}, {max:.2}]")]
    UnsupportedExtrapolation { ratio: f64, min: f64, max: f64 },

    /// Intermediate race conflicts with the goal date or its taper window
    #[error("Race scheduling conflict on {date}: {reason}")]
    RaceSchedulingConflict { date: NaiveDate, reason: String },

    /// Configuration table failed validation or could not be loaded
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PlanError {
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by user-supplied parameters rather than the
    /// configuration table. The UI layer prompts for corrected input on these.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput { field, reason } => {
                format!("Please check the {field} field: {reason}")
            }
            Self::InsufficientTimeWindow {
                available_weeks,
                required_weeks,
            } => format!(
                "The plan window is too short: {available_weeks} weeks between start and race, \
                 but this distance needs at least {required_weeks}."
            ),
            Self::UnsupportedExtrapolation { .. } => {
                "The reference performance is too far from the goal distance to extrapolate \
                 reliably. Use a reference race closer to the goal distance."
                    .to_string()
            }
            Self::RaceSchedulingConflict { date, reason } => {
                format!("The race on {date} cannot be scheduled: {reason}")
            }
            Self::Configuration(msg) => format!("Configuration problem: {msg}"),
        }
    }
}

/// Result type alias for planrs operations
pub type Result<T> = std::result::Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        let err = PlanError::invalid_input("reference.distance_km", "must be positive");
        assert!(err.is_validation());

        let err = PlanError::Configuration("zone multipliers not ordered".to_string());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_user_messages() {
        let err = PlanError::InsufficientTimeWindow {
            available_weeks: 10,
            required_weeks: 12,
        };
        assert!(err.user_message().contains("at least 12"));

        let err = PlanError::RaceSchedulingConflict {
            date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            reason: "coincides with the goal race".to_string(),
        };
        assert!(err.user_message().contains("2024-06-02"));
    }
}
