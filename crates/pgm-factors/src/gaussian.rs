//! Multivariate Gaussian distributions in moment (mean/covariance) form.
//!
//! # Example
//!
//! ```
//! use nalgebra::{DMatrix, DVector};
//! use pgm_factors::JointGaussianDistribution;
//!
//! let jgd = JointGaussianDistribution::new(
//!     vec!["x1".to_string(), "x2".to_string()],
//!     DVector::from_vec(vec![1.0, -3.0]),
//!     DMatrix::from_row_slice(2, 2, &[4.0, 2.0, 2.0, 5.0]),
//! )
//! .unwrap();
//!
//! let density = jgd.pdf(&[1.0, -3.0]).unwrap();
//! assert!(density > 0.0);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use pgm_config::NumericsSettings;
use pgm_math::LN_2PI;
use tracing::debug;

use crate::canonical::CanonicalFactor;
use crate::error::{FactorError, Result};
use crate::linalg;
use crate::scope::{self, Variable};

/// A pointwise density function over a factor's scope, in scope order.
///
/// Density functions are stateless and shared by reference between copies.
pub type DensityFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Gaussian `N(mean, covariance)` over an ordered scope.
#[derive(Debug, Clone, PartialEq)]
pub struct JointGaussianDistribution<V: Variable = String> {
    scope: Vec<V>,
    mean: DVector<f64>,
    covariance: DMatrix<f64>,
}

impl<V: Variable> JointGaussianDistribution<V> {
    /// Creates a distribution after checking that `mean` has one entry per
    /// variable and `covariance` is `n×n`.
    pub fn new(scope: Vec<V>, mean: DVector<f64>, covariance: DMatrix<f64>) -> Result<Self> {
        let n = scope.len();
        scope::ensure_distinct(&scope)?;
        if mean.len() != n {
            return Err(FactorError::ShapeMismatch {
                parameter: "mean",
                expected: n.to_string(),
                actual: mean.len().to_string(),
            });
        }
        if covariance.shape() != (n, n) {
            return Err(FactorError::ShapeMismatch {
                parameter: "covariance",
                expected: format!("({}, {})", n, n),
                actual: format!("({}, {})", covariance.nrows(), covariance.ncols()),
            });
        }
        Ok(Self {
            scope,
            mean,
            covariance,
        })
    }

    pub fn scope(&self) -> &[V] {
        &self.scope
    }

    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// Number of variables.
    pub fn dim(&self) -> usize {
        self.scope.len()
    }

    /// Inverse covariance.
    pub fn precision_matrix(&self) -> Result<DMatrix<f64>> {
        linalg::invert(&self.covariance, "covariance")
    }

    /// Log density at `point` (values in scope order).
    pub fn log_pdf(&self, point: &[f64]) -> Result<f64> {
        self.check_point(point)?;
        let chol = self.covariance_cholesky()?;
        Ok(log_density(&self.mean, &chol, point))
    }

    /// Density at `point` (values in scope order).
    pub fn pdf(&self, point: &[f64]) -> Result<f64> {
        self.log_pdf(point).map(f64::exp)
    }

    /// A reusable density function with the covariance factorized once.
    ///
    /// The returned function yields NaN for points of the wrong length.
    pub fn density(&self) -> Result<DensityFn> {
        let chol = self.covariance_cholesky()?;
        let mean = self.mean.clone();
        Ok(Arc::new(move |point: &[f64]| {
            if point.len() != mean.len() {
                return f64::NAN;
            }
            log_density(&mean, &chol, point).exp()
        }))
    }

    /// Equivalent canonical form:
    /// `K = Σ⁻¹`, `h = Kμ`, `g = −½ μᵀKμ − ln((2π)^{n/2} |Σ|^{1/2})`.
    pub fn to_canonical_factor(&self) -> Result<CanonicalFactor<V>> {
        let chol = self.covariance_cholesky()?;
        let k = chol.inverse();
        let h = &k * &self.mean;
        let n = self.dim() as f64;
        let g = -0.5 * self.mean.dot(&h) - 0.5 * (n * LN_2PI + linalg::ln_det(&chol));
        CanonicalFactor::new(self.scope.clone(), k, h, g)
    }

    /// Marginal distribution with `vars` integrated out.
    pub fn marginalize<Q>(&self, vars: &[&Q]) -> Result<Self>
    where
        V: Borrow<Q>,
        Q: Eq + fmt::Debug + ?Sized,
    {
        let removed = scope::sorted_positions(&self.scope, vars)?;
        let kept = scope::complement(self.dim(), &removed);
        debug!(kept = kept.len(), removed = removed.len(), "marginalizing joint gaussian");
        Ok(Self {
            scope: kept.iter().map(|&i| self.scope[i].clone()).collect(),
            mean: linalg::entries(&self.mean, &kept),
            covariance: linalg::block(&self.covariance, &kept, &kept),
        })
    }

    /// Conditional distribution of the remaining variables given observed
    /// `values`:
    /// `μ_k + Σ_kr Σ_rr⁻¹ (y − μ_r)` and `Σ_kk − Σ_kr Σ_rr⁻¹ Σ_rk`.
    pub fn reduce<Q>(&self, values: &[(&Q, f64)]) -> Result<Self>
    where
        V: Borrow<Q>,
        Q: Eq + fmt::Debug + ?Sized,
    {
        let obs = scope::align_observation(&self.scope, values)?;
        let kept = scope::complement(self.dim(), &obs.indices);
        let y = DVector::from_vec(obs.values);

        let s_kk = linalg::block(&self.covariance, &kept, &kept);
        let s_kr = linalg::block(&self.covariance, &kept, &obs.indices);
        let s_rr = linalg::block(&self.covariance, &obs.indices, &obs.indices);
        let s_rr_inv = linalg::invert(&s_rr, "observed covariance block")?;
        let gain = &s_kr * s_rr_inv;

        let residual = y - linalg::entries(&self.mean, &obs.indices);
        let mean = linalg::entries(&self.mean, &kept) + &gain * residual;
        let covariance = s_kk - &gain * s_kr.transpose();

        debug!(kept = kept.len(), observed = obs.indices.len(), "conditioned joint gaussian");
        Ok(Self {
            scope: kept.iter().map(|&i| self.scope[i].clone()).collect(),
            mean,
            covariance,
        })
    }

    /// Cholesky factor of the covariance, which must be symmetric within the
    /// default tolerance and positive definite.
    fn covariance_cholesky(&self) -> Result<Cholesky<f64, Dyn>> {
        let all: Vec<usize> = (0..self.dim()).collect();
        let tol = NumericsSettings::default().symmetry_tolerance;
        linalg::check_symmetric_blocks(&self.covariance, &all, &all, tol)?;
        linalg::cholesky(&self.covariance, "covariance")
    }

    fn check_point(&self, point: &[f64]) -> Result<()> {
        if point.len() != self.dim() {
            return Err(FactorError::ShapeMismatch {
                parameter: "point",
                expected: self.dim().to_string(),
                actual: point.len().to_string(),
            });
        }
        Ok(())
    }
}

fn log_density(mean: &DVector<f64>, chol: &Cholesky<f64, Dyn>, point: &[f64]) -> f64 {
    let diff = DVector::from_column_slice(point) - mean;
    let mahalanobis = diff.dot(&chol.solve(&diff));
    let n = mean.len() as f64;
    -0.5 * (n * LN_2PI + linalg::ln_det(chol) + mahalanobis)
}
