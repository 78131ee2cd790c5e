//! Error types for factor operations.

use thiserror::Error;

/// Errors raised by canonical and moment-form Gaussian factors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactorError {
    /// A parameter's shape disagrees with the scope length.
    #[error("shape mismatch for {parameter}: expected {expected}, got {actual}")]
    ShapeMismatch {
        parameter: &'static str,
        expected: String,
        actual: String,
    },

    /// A scope names the same variable twice.
    #[error("duplicate variable in scope: {0}")]
    DuplicateVariable(String),

    /// A variable is not part of the factor's scope.
    #[error("variable not in scope: {0}")]
    UnknownVariable(String),

    /// Malformed reduction values.
    #[error("invalid reduction values: {0}")]
    InvalidValues(String),

    /// A matrix that must be inverted is singular.
    #[error("singular matrix: {0}")]
    SingularMatrix(String),

    /// A matrix that must be factorized is not positive definite.
    #[error("matrix is not positive definite: {0}")]
    NotPositiveDefinite(String),

    /// The precision (or covariance) entries consumed by an operation are
    /// not symmetric.
    #[error("matrix is not symmetric: entries [{row},{col}] and [{col},{row}] differ by {deviation}")]
    AsymmetricPrecision { row: usize, col: usize, deviation: f64 },

    /// A divisor's scope is not contained in the dividend's scope.
    #[error("divisor scope is not a subset of the factor scope: {0}")]
    ScopeNotSubset(String),
}

impl FactorError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            FactorError::ShapeMismatch { .. } => 30,
            FactorError::DuplicateVariable(_) => 31,
            FactorError::UnknownVariable(_) => 32,
            FactorError::InvalidValues(_) => 33,
            FactorError::SingularMatrix(_) => 34,
            FactorError::NotPositiveDefinite(_) => 35,
            FactorError::AsymmetricPrecision { .. } => 36,
            FactorError::ScopeNotSubset(_) => 37,
        }
    }
}

/// Errors raised when configuring a discretizer or a univariate distribution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiscretizeError {
    #[error("invalid range: frm ({frm}) must be finite and less than to ({to})")]
    InvalidRange { frm: f64, to: f64 },

    #[error("invalid step: must be positive and finite, got {0}")]
    InvalidStep(f64),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The range and step describe more grid points than allowed.
    #[error("grid of {points} points exceeds the limit of {max}")]
    GridTooLarge { points: f64, max: usize },
}

impl DiscretizeError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            DiscretizeError::InvalidRange { .. } => 40,
            DiscretizeError::InvalidStep(_) => 41,
            DiscretizeError::InvalidParameter { .. } => 42,
            DiscretizeError::GridTooLarge { .. } => 43,
        }
    }
}

/// Result type alias for factor operations.
pub type Result<T> = std::result::Result<T, FactorError>;
