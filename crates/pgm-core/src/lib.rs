//! pgm: Gaussian factor algebra, discretization and conditional
//! independence tests for probabilistic graphical models.
//!
//! This crate ties the workspace together:
//! - [`logging`]: subscriber setup for the `tracing` events the other
//!   crates emit
//! - [`load_settings`]: resolve, parse and validate the settings file
//! - [`prelude`]: the commonly used types from every crate

pub mod logging;

use std::path::{Path, PathBuf};

use pgm_config::{resolve_settings_path, validate_settings, ConfigSource, Settings, ValidationError};
use tracing::{debug, info};

pub use pgm_config as config;
pub use pgm_estimators as estimators;
pub use pgm_factors as factors;
pub use pgm_math as math;

/// Settings together with where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: ConfigSource,
    /// File the settings were read from; `None` for builtin defaults.
    pub path: Option<PathBuf>,
}

/// Resolve the settings file (see [`resolve_settings_path`]), load it and
/// validate it. Without any settings file the validated defaults are used.
pub fn load_settings(cli_path: Option<&Path>) -> Result<LoadedSettings, ValidationError> {
    let resolved = resolve_settings_path(cli_path);
    let settings = match &resolved.path {
        Some(path) => {
            debug!(path = %path.display(), source = %resolved.source, "loading settings");
            Settings::from_file(path)?
        }
        None => Settings::default(),
    };
    validate_settings(&settings)?;
    info!(
        source = %resolved.source,
        ci_test = %settings.ci_test.method,
        "settings loaded"
    );
    Ok(LoadedSettings {
        settings,
        source: resolved.source,
        path: resolved.path,
    })
}

/// Commonly used types.
pub mod prelude {
    pub use crate::logging::{init_logging, LogConfig, LogFormat, LogLevel};
    pub use crate::{load_settings, LoadedSettings};
    pub use pgm_config::{CiTestMethod, CiTestSettings, DiscretizeSettings, NumericsSettings, Settings};
    pub use pgm_estimators::{
        chi_square, independence_match, independence_test, pearsonr, run_ci_test, CiTestOutcome,
        DataSet, EstimatorError, IndependenceAssertion, Independencies,
    };
    pub use pgm_factors::nalgebra::{DMatrix, DVector};
    pub use pgm_factors::{
        CanonicalFactor, CumulativeDistribution, DensityFn, DiscretizeError, Discretizer, FactorError,
        JointGaussianDistribution, RoundingDiscretizer, UnivariateNormal,
    };
}
