//! pgm configuration loading and validation.
//!
//! This crate provides:
//! - Typed settings for numerics, independence tests and discretization
//! - Settings resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation with stable error codes

pub mod resolve;
pub mod settings;
pub mod validate;

pub use resolve::{resolve_settings_path, ConfigSource, ResolvedPath};
pub use settings::{CiTestMethod, CiTestSettings, DiscretizeSettings, NumericsSettings, Settings};
pub use validate::{validate_settings, ValidationError, ValidationResult};

/// Schema version for settings files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
