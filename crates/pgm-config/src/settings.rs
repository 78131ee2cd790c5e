//! Settings types.
//!
//! Every section has serde defaults, so a file only needs to name the
//! values it overrides. Both JSON and TOML encodings are accepted.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::validate::ValidationError;

/// Complete settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub numerics: NumericsSettings,

    #[serde(default)]
    pub ci_test: CiTestSettings,

    #[serde(default)]
    pub discretize: DiscretizeSettings,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            description: None,
            numerics: NumericsSettings::default(),
            ci_test: CiTestSettings::default(),
            discretize: DiscretizeSettings::default(),
        }
    }
}

/// Numerical tolerances used by the Gaussian factor algebra.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericsSettings {
    /// Relative tolerance when checking that precision blocks are symmetric.
    pub symmetry_tolerance: f64,
}

impl Default for NumericsSettings {
    fn default() -> Self {
        Self {
            symmetry_tolerance: 1e-9,
        }
    }
}

/// Which conditional-independence test to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiTestMethod {
    /// Chi-square test on contingency tables (discrete data).
    #[default]
    ChiSquare,
    /// Pearson correlation, partial via regression residuals (continuous data).
    Pearsonr,
}

impl std::str::FromStr for CiTestMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chi_square" | "chi2" | "chisquare" => Ok(CiTestMethod::ChiSquare),
            "pearsonr" | "pearson" => Ok(CiTestMethod::Pearsonr),
            _ => Err(format!("unknown CI test: {}", s)),
        }
    }
}

impl std::fmt::Display for CiTestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CiTestMethod::ChiSquare => write!(f, "chi_square"),
            CiTestMethod::Pearsonr => write!(f, "pearsonr"),
        }
    }
}

/// Conditional-independence test settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CiTestSettings {
    pub method: CiTestMethod,

    /// Independence is accepted when the p-value is at least this level.
    pub significance_level: f64,

    /// Rows required per free parameter before the chi-square result is
    /// considered backed by sufficient data.
    pub min_samples_per_param: u32,
}

impl Default for CiTestSettings {
    fn default() -> Self {
        Self {
            method: CiTestMethod::ChiSquare,
            significance_level: 0.05,
            min_samples_per_param: 5,
        }
    }
}

/// Default grid for discretizing univariate distributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscretizeSettings {
    pub frm: f64,
    pub to: f64,
    pub step: f64,
}

impl Default for DiscretizeSettings {
    fn default() -> Self {
        Self {
            frm: -3.0,
            to: 3.0,
            step: 0.5,
        }
    }
}

impl Settings {
    /// Load settings from a file; `.toml` files are parsed as TOML, anything
    /// else as JSON.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Parse settings from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Parse settings from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ValidationError> {
        toml::from_str(text)
            .map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
    }
}
