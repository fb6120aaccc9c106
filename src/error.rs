//! Error types for deal analysis

use thiserror::Error;

/// Errors raised by the analysis engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// An input field is outside its allowed range. Raised before any numeric work.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A computation hit a singularity (zero derivative, zero equity, ...)
    /// that would otherwise surface as NaN or infinity.
    #[error("numeric degeneracy in {context}")]
    NumericDegeneracy { context: String },

    /// IRR search exhausted its iteration cap. Only raised in strict mode;
    /// the best-effort rate is carried along so callers can still display it.
    #[error("IRR did not converge after {iterations} iterations (best estimate {best_estimate:.4}%)")]
    NonConvergence { iterations: u32, best_estimate: f64 },
}

impl AnalysisError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AnalysisError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(context: impl Into<String>) -> Self {
        AnalysisError::NumericDegeneracy {
            context: context.into(),
        }
    }

    /// Name of the offending input field, for validation failures
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AnalysisError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = AnalysisError::validation("down_payment_percent", "must be below 100, got 100");
        assert_eq!(err.field(), Some("down_payment_percent"));
        assert_eq!(
            err.to_string(),
            "invalid down_payment_percent: must be below 100, got 100"
        );
    }

    #[test]
    fn test_non_convergence_message_carries_estimate() {
        let err = AnalysisError::NonConvergence {
            iterations: 100,
            best_estimate: 12.345678,
        };
        assert!(err.to_string().contains("12.3457%"));
        assert_eq!(err.field(), None);
    }
}
