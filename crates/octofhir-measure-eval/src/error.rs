//! Evaluation errors for the measure engine

use octofhir_measure_diagnostics::{ErrorCode, MQ0109, MQ0201, MQ0400, MeasureError};
use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur while setting up or running an evaluation
///
/// Per-record data problems are never errors; they degrade the record and
/// are reported as diagnostics on the run.
#[derive(Debug, Error, Clone)]
pub enum EvalError {
    /// Measurement year outside the supported calendar
    #[error("Invalid measurement year: {year}")]
    InvalidMeasurementYear { year: i32 },

    /// Measure configuration rejected
    #[error(transparent)]
    Configuration(#[from] MeasureError),

    /// A result invariant did not hold
    #[error("Invariant violated for member {member_id}: {message}")]
    InvariantViolated { member_id: String, message: String },

    /// Internal error (should not happen)
    #[error("Internal evaluation error: {message}")]
    Internal { message: String },
}

impl EvalError {
    /// Create an invalid measurement year error
    pub fn invalid_year(year: i32) -> Self {
        Self::InvalidMeasurementYear { year }
    }

    /// Create an invariant violation error
    pub fn invariant(member_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvariantViolated {
            member_id: member_id.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Error code this error maps to
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalError::Configuration(inner) => inner.code(),
            EvalError::InvalidMeasurementYear { .. } => MQ0109,
            EvalError::InvariantViolated { .. } => MQ0201,
            EvalError::Internal { .. } => MQ0400,
        }
    }
}

impl From<EvalError> for MeasureError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::Configuration(inner) => inner,
            EvalError::InvalidMeasurementYear { .. } => {
                MeasureError::configuration(MQ0109, err.to_string())
            }
            EvalError::InvariantViolated { .. } => MeasureError::evaluation(MQ0201, err.to_string()),
            EvalError::Internal { .. } => MeasureError::system(MQ0400, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_measure_diagnostics::MQ0100;

    #[test]
    fn test_into_measure_error() {
        let err: MeasureError = EvalError::invalid_year(-5).into();
        assert_eq!(err.code(), MQ0109);
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn test_configuration_passthrough() {
        let inner = MeasureError::configuration(MQ0100, "unknown measure 'X'");
        let err = EvalError::from(inner);
        assert_eq!(err.code(), MQ0100);
        assert_eq!(MeasureError::from(err).code(), MQ0100);
    }
}
