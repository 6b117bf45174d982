//! Error type shared by all runners.
//!
//! Only configuration problems are errors. Empty boxes, non-finite
//! objective values and exhausted budgets are ordinary search outcomes
//! and are reported through the runners' result structs instead.

use thiserror::Error;

/// Errors raised while validating a configuration or writing results.
#[derive(Debug, Error)]
pub enum FdError {
    /// A configuration field has an unusable value.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of the constraint that failed.
        reason: String,
    },

    /// The root box does not match the problem's dimension.
    #[error("dimension mismatch: problem has {expected} variables, box has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A variant label that is not part of the catalogue.
    #[error("unknown variant '{0}'")]
    UnknownVariant(String),

    /// Failure while writing the result log.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FdError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        FdError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
