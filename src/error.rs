//! Engine Errors
//!
//! Configuration and structural errors raised by the scoring engine.
//! Every variant is detected before any field is synthesized.
//!
//! A raw field whose values are all equal is NOT an error: it normalizes to
//! all-zero (see `utils::normalization`).

use crate::factors::Factor;

/// Errors surfaced by the scoring engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Grid bounds or resolution are malformed
    #[error("invalid grid spec: {reason}")]
    InvalidSpec { reason: String },

    /// A source was rejected at registration
    #[error("invalid source '{name}' for factor {factor}: {reason}")]
    InvalidSource {
        factor: Factor,
        name: String,
        reason: String,
    },

    /// A factor profile carries an unusable display band or decay scale
    #[error("invalid profile for factor {factor}: {reason}")]
    InvalidProfile { factor: Factor, reason: String },

    /// Weights are missing a factor, negative, or do not sum to 1
    #[error("invalid weights: {reason}")]
    InvalidWeights { reason: String },

    /// Zone thresholds are not strictly ascending within [0, 1]
    #[error("invalid zone thresholds: {reason}")]
    InvalidThresholds { reason: String },

    /// Arrays built from different grids were mixed
    #[error("shape mismatch: expected {expected}x{expected}, found {found}x{found}")]
    ShapeMismatch { expected: usize, found: usize },
}

impl EngineError {
    pub(crate) fn spec(reason: impl Into<String>) -> Self {
        EngineError::InvalidSpec { reason: reason.into() }
    }

    pub(crate) fn weights(reason: impl Into<String>) -> Self {
        EngineError::InvalidWeights { reason: reason.into() }
    }

    pub(crate) fn thresholds(reason: impl Into<String>) -> Self {
        EngineError::InvalidThresholds { reason: reason.into() }
    }
}

/// Result alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;
