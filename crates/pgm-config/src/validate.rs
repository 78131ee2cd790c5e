//! Settings validation errors and semantic validation.

use thiserror::Error;

use crate::settings::{CiTestSettings, DiscretizeSettings, NumericsSettings, Settings};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Settings validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate settings semantically.
pub fn validate_settings(settings: &Settings) -> ValidationResult<()> {
    if settings.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: settings.schema_version.clone(),
        });
    }

    validate_numerics(&settings.numerics)?;
    validate_ci_test(&settings.ci_test)?;
    validate_discretize(&settings.discretize)?;

    Ok(())
}

fn validate_numerics(numerics: &NumericsSettings) -> ValidationResult<()> {
    let tol = numerics.symmetry_tolerance;
    if !tol.is_finite() || tol < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "numerics.symmetry_tolerance".to_string(),
            message: format!("Must be finite and non-negative, got {}", tol),
        });
    }
    Ok(())
}

fn validate_ci_test(ci_test: &CiTestSettings) -> ValidationResult<()> {
    let level = ci_test.significance_level;
    if !(level > 0.0 && level < 1.0) {
        return Err(ValidationError::InvalidValue {
            field: "ci_test.significance_level".to_string(),
            message: format!("Must be in (0, 1), got {}", level),
        });
    }

    if ci_test.min_samples_per_param == 0 {
        return Err(ValidationError::InvalidValue {
            field: "ci_test.min_samples_per_param".to_string(),
            message: "Must be positive".to_string(),
        });
    }

    Ok(())
}

fn validate_discretize(discretize: &DiscretizeSettings) -> ValidationResult<()> {
    if !discretize.frm.is_finite() || !discretize.to.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: "discretize".to_string(),
            message: format!(
                "Range bounds must be finite, got [{}, {})",
                discretize.frm, discretize.to
            ),
        });
    }

    if discretize.frm >= discretize.to {
        return Err(ValidationError::SemanticError(format!(
            "discretize.frm ({}) must be less than discretize.to ({})",
            discretize.frm, discretize.to
        )));
    }

    if !(discretize.step > 0.0 && discretize.step.is_finite()) {
        return Err(ValidationError::InvalidValue {
            field: "discretize.step".to_string(),
            message: format!("Must be positive, got {}", discretize.step),
        });
    }

    Ok(())
}
