//! Error types and result utilities for onset engine operations.

use thiserror::Error;

/// Convenience type alias for results that may contain an [`OnsetError`].
pub type OnsetResult<T> = Result<T, OnsetError>;

/// Error types that can occur while configuring or driving the onset engine.
///
/// Nothing on the per-block path returns an error: numeric degeneracies are
/// resolved in place. Errors are raised when configuration is built or updated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OnsetError {
    /// Error that occurs when invalid parameters are provided.
    ///
    /// This includes negative or non-finite thresholds, a zero history length,
    /// a zero sample rate and similar configuration mistakes.
    #[error("Invalid parameter error: `{parameter}` {reason}")]
    InvalidParameter {
        /// Name of the rejected parameter.
        parameter: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Error that occurs when input dimensions don't match expected values.
    ///
    /// This happens when a batch strength matrix does not have one column per feature.
    #[error("Dimension mismatch error: {0}")]
    DimensionMismatch(String),
}

impl OnsetError {
    /// Create an [`OnsetError::InvalidParameter`] for the named parameter.
    pub fn invalid_parameter(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }

    /// Returns the parameter name when this is a parameter error.
    pub const fn parameter(&self) -> Option<&'static str> {
        match self {
            Self::InvalidParameter { parameter, .. } => Some(*parameter),
            Self::DimensionMismatch(_) => None,
        }
    }
}

/// Checks that a real-valued parameter is finite and not negative.
pub(crate) fn ensure_non_negative(parameter: &'static str, value: f32) -> OnsetResult<()> {
    if !value.is_finite() {
        return Err(OnsetError::invalid_parameter(
            parameter,
            format!("must be finite, got {value}"),
        ));
    }
    if value < 0.0 {
        return Err(OnsetError::invalid_parameter(
            parameter,
            format!("must be >= 0, got {value}"),
        ));
    }
    Ok(())
}
