//! Continuous factors for Gaussian-network inference.
//!
//! - [`canonical::CanonicalFactor`]: unnormalized Gaussian potentials in
//!   `(K, h, g)` form, closed under reduction, marginalization, product and
//!   division.
//! - [`gaussian::JointGaussianDistribution`]: the moment (mean/covariance)
//!   form with density evaluation.
//! - [`discretize`]: piecewise-constant mass functions from univariate CDFs.

pub mod canonical;
pub mod discretize;
pub mod error;
pub mod gaussian;
mod linalg;
pub mod scope;

pub use nalgebra;

pub use canonical::CanonicalFactor;
pub use discretize::{CumulativeDistribution, Discretizer, RoundingDiscretizer, UnivariateNormal};
pub use error::{DiscretizeError, FactorError, Result};
pub use gaussian::{DensityFn, JointGaussianDistribution};
pub use scope::Variable;
