//! Error types for cvxbridge.

use thiserror::Error;

use crate::expr::{ConstraintIndex, VariableIndex};

/// Error type for bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A cone dimension disagrees with the function it is paired with.
    #[error("Unsupported shape: expected {expected}, got {got}")]
    UnsupportedShape { expected: String, got: String },

    /// No bridge handles this cone (or the cone is not the one a bridge expects).
    #[error("Unsupported cone: {0}")]
    UnsupportedCone(String),

    /// Internal consistency check failed. Indicates a defect, not a runtime condition.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Error raised by the host model, passed through unchanged.
    #[error(transparent)]
    Host(#[from] ModelError),
}

/// Error type raised by a host model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Variable handle is unknown or was deleted.
    #[error("Invalid variable index: {0:?}")]
    InvalidVariable(VariableIndex),

    /// Constraint handle is unknown or was deleted.
    #[error("Invalid constraint index: {0:?}")]
    InvalidConstraint(ConstraintIndex),

    /// A result attribute was requested before it was available.
    #[error("Result unavailable: {0}")]
    ResultUnavailable(String),

    /// A value does not match the dimension of its target.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Result type for cvxbridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    pub(crate) fn shape(expected: impl ToString, got: impl ToString) -> Self {
        BridgeError::UnsupportedShape {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}
