//! Error types for data handling and independence tests.

use thiserror::Error;

/// Errors raised by independence tests and their inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// A column's length differs from the data set's row count.
    #[error("column {column} has {actual} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("insufficient data: need at least {needed} rows, got {actual}")]
    InsufficientData { needed: usize, actual: usize },

    /// Correlation is undefined for a constant input.
    #[error("constant input: {0}")]
    ConstantInput(String),

    #[error("invalid independence assertion: {0}")]
    InvalidAssertion(String),

    /// Least-squares regression on the conditioning set failed.
    #[error("regression failed: {0}")]
    Regression(String),

    /// The contingency table over the tested variables has too many cells.
    #[error("contingency table over {variables} variables exceeds {max_cells} cells")]
    TableTooLarge { variables: usize, max_cells: usize },
}

impl EstimatorError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            EstimatorError::UnknownColumn(_) => 50,
            EstimatorError::DuplicateColumn(_) => 51,
            EstimatorError::RaggedColumns { .. } => 52,
            EstimatorError::InsufficientData { .. } => 53,
            EstimatorError::ConstantInput(_) => 54,
            EstimatorError::InvalidAssertion(_) => 55,
            EstimatorError::Regression(_) => 56,
            EstimatorError::TableTooLarge { .. } => 57,
        }
    }
}

/// Result type alias for estimator operations.
pub type Result<T> = std::result::Result<T, EstimatorError>;
