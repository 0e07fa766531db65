//! Errors raised by the projection engine.

use thiserror::Error;

/// Failure of a projection query.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    /// A precondition on the arguments was violated.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The target can never be reached by attending more classes.
    #[error("a target of {target_percent}% cannot be reached")]
    Unreachable { target_percent: f64 },
}

impl ProjectionError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Whether this error is an `InvalidInput` condition.
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}
