//! Gaussian potentials in canonical form.
//!
//! A canonical factor over scope `x` is the unnormalized potential
//!
//! ```text
//! φ(x) = exp(−½ xᵀKx + hᵀx + g)
//! ```
//!
//! Conditioning on evidence ([`CanonicalFactor::reduce`]) and integrating a
//! variable out ([`CanonicalFactor::marginalize`]) both stay in this family,
//! which makes it the working representation for variable elimination in
//! Gaussian networks. The precision matrix `K` is not required to be
//! invertible while a factor is being eliminated; only conversion to moment
//! form needs that.
//!
//! # Example
//!
//! ```
//! use pgm_factors::CanonicalFactor;
//!
//! let phi = CanonicalFactor::from_rows(
//!     vec!["X1".to_string(), "X2".to_string(), "X3".to_string()],
//!     &[vec![1.0, -1.0, 0.0], vec![-1.0, 4.0, -2.0], vec![0.0, -2.0, 4.0]],
//!     &[1.0, 4.0, -1.0],
//!     -2.0,
//! )
//! .unwrap();
//!
//! let reduced = phi.reduce(&[("X3", 0.25)]).unwrap();
//! assert_eq!(reduced.scope(), &["X1".to_string(), "X2".to_string()]);
//! assert!((reduced.g() + 2.375).abs() < 1e-12);
//! ```

use std::borrow::Borrow;
use std::fmt;

use nalgebra::{DMatrix, DVector};
use pgm_config::NumericsSettings;
use pgm_math::LN_2PI;
use tracing::debug;

use crate::error::{FactorError, Result};
use crate::gaussian::{DensityFn, JointGaussianDistribution};
use crate::linalg;
use crate::scope::{self, Variable};

/// Unnormalized Gaussian potential `(K, h, g)` over an ordered scope.
///
/// `Clone` is a deep copy of `K` and `h`; a bound density function is
/// shared with the copy.
#[derive(Clone)]
pub struct CanonicalFactor<V: Variable = String> {
    scope: Vec<V>,
    k: DMatrix<f64>,
    h: DVector<f64>,
    g: f64,
    density: Option<DensityFn>,
}

impl<V: Variable> fmt::Debug for CanonicalFactor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalFactor")
            .field("scope", &self.scope)
            .field("k", &self.k)
            .field("h", &self.h)
            .field("g", &self.g)
            .field("has_density", &self.density.is_some())
            .finish()
    }
}

impl<V: Variable> CanonicalFactor<V> {
    /// Creates a factor, checking that `k` is `n×n` and `h` has `n` entries
    /// for a scope of `n` distinct variables.
    ///
    /// Symmetry and definiteness of `k` are not checked here.
    pub fn new(scope: Vec<V>, k: DMatrix<f64>, h: DVector<f64>, g: f64) -> Result<Self> {
        scope::ensure_distinct(&scope)?;
        check_shapes(scope.len(), &k, &h)?;
        Ok(Self {
            scope,
            k,
            h,
            g,
            density: None,
        })
    }

    /// Creates a factor from row-major `k` and a flat `h`.
    pub fn from_rows(scope: Vec<V>, k: &[Vec<f64>], h: &[f64], g: f64) -> Result<Self> {
        let n = scope.len();
        if let Some(row) = k.iter().find(|row| row.len() != n) {
            return Err(FactorError::ShapeMismatch {
                parameter: "K",
                expected: format!("({}, {})", n, n),
                actual: format!("({}, {})", k.len(), row.len()),
            });
        }
        let k = DMatrix::from_row_iterator(k.len(), n, k.iter().flatten().copied());
        Self::new(scope, k, DVector::from_column_slice(h), g)
    }

    /// Creates a factor with `h` given as either a 1×n row or an n×1 column.
    pub fn with_h_matrix(scope: Vec<V>, k: DMatrix<f64>, h: DMatrix<f64>, g: f64) -> Result<Self> {
        let column = linalg::as_column(&h).ok_or_else(|| FactorError::ShapeMismatch {
            parameter: "h",
            expected: format!("({}, 1)", scope.len()),
            actual: format!("({}, {})", h.nrows(), h.ncols()),
        })?;
        Self::new(scope, k, column, g)
    }

    /// Binds an explicit density function.
    pub fn with_density(mut self, density: DensityFn) -> Self {
        self.density = Some(density);
        self
    }

    pub fn scope(&self) -> &[V] {
        &self.scope
    }

    /// Precision matrix `K`.
    pub fn k(&self) -> &DMatrix<f64> {
        &self.k
    }

    pub fn h(&self) -> &DVector<f64> {
        &self.h
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    /// Number of variables in scope.
    pub fn dim(&self) -> usize {
        self.scope.len()
    }

    /// Whether a density function is currently bound.
    pub fn has_density(&self) -> bool {
        self.density.is_some()
    }

    pub fn density(&self) -> Option<&DensityFn> {
        self.density.as_ref()
    }

    /// Replaces `K`, `h` and `g` over the current scope and drops the bound
    /// density.
    pub fn set_parameters(&mut self, k: DMatrix<f64>, h: DVector<f64>, g: f64) -> Result<()> {
        check_shapes(self.dim(), &k, &h)?;
        self.k = k;
        self.h = h;
        self.g = g;
        self.density = None;
        Ok(())
    }

    /// `ln φ(x) = −½ xᵀKx + hᵀx + g` at `point` (values in scope order).
    pub fn log_potential(&self, point: &[f64]) -> Result<f64> {
        self.check_point(point)?;
        let x = DVector::from_column_slice(point);
        Ok(-0.5 * x.dot(&(&self.k * &x)) + self.h.dot(&x) + self.g)
    }

    /// Moment form: `covariance = K⁻¹`, `mean = covariance · h`.
    ///
    /// A singular `K` is an error; there is no pseudo-inverse fallback.
    pub fn to_joint_gaussian(&self) -> Result<JointGaussianDistribution<V>> {
        let covariance = linalg::invert(&self.k, "precision matrix")?;
        let mean = &covariance * &self.h;
        debug!(dim = self.dim(), "converted canonical factor to moment form");
        JointGaussianDistribution::new(self.scope.clone(), mean, covariance)
    }

    /// Density of the equivalent Gaussian at `point` (values in scope order).
    ///
    /// The moment form is materialized on the first call and its density is
    /// bound to the factor; later calls reuse it until the factor changes.
    pub fn assignment(&mut self, point: &[f64]) -> Result<f64> {
        self.check_point(point)?;
        let density = match &self.density {
            Some(density) => density.clone(),
            None => {
                let density = self.to_joint_gaussian()?.density()?;
                debug!(dim = self.dim(), "bound density to canonical factor");
                self.density = Some(density.clone());
                density
            }
        };
        Ok(density(point))
    }

    /// Conditions on observed `values`, returning a new factor over the
    /// remaining variables. `self` is untouched.
    ///
    /// Pairs may be given in any order. Uses the default numeric settings.
    pub fn reduce<Q>(&self, values: &[(&Q, f64)]) -> Result<Self>
    where
        V: Borrow<Q>,
        Q: Eq + fmt::Debug + ?Sized,
    {
        self.reduce_with(values, &NumericsSettings::default())
    }

    /// Conditions on observed `values` in place.
    pub fn reduce_in_place<Q>(&mut self, values: &[(&Q, f64)]) -> Result<()>
    where
        V: Borrow<Q>,
        Q: Eq + fmt::Debug + ?Sized,
    {
        self.reduce_in_place_with(values, &NumericsSettings::default())
    }

    pub fn reduce_with<Q>(&self, values: &[(&Q, f64)], settings: &NumericsSettings) -> Result<Self>
    where
        V: Borrow<Q>,
        Q: Eq + fmt::Debug + ?Sized,
    {
        let mut reduced = self.clone();
        reduced.reduce_in_place_with(values, settings)?;
        Ok(reduced)
    }

    /// Conditions on `values` in place:
    ///
    /// ```text
    /// K' = K_kk
    /// h' = h_k − K_kr y
    /// g' = g + h_rᵀ y − ½ yᵀ K_rr y
    /// ```
    ///
    /// where `y` is ordered by scope position. The formula assumes
    /// `K_kr = K_rkᵀ`; a deviation beyond `settings.symmetry_tolerance`
    /// fails with [`FactorError::AsymmetricPrecision`]. On error `self` is
    /// left unchanged.
    pub fn reduce_in_place_with<Q>(
        &mut self,
        values: &[(&Q, f64)],
        settings: &NumericsSettings,
    ) -> Result<()>
    where
        V: Borrow<Q>,
        Q: Eq + fmt::Debug + ?Sized,
    {
        let obs = scope::align_observation(&self.scope, values)?;
        let kept = scope::complement(self.dim(), &obs.indices);
        linalg::check_symmetric_blocks(&self.k, &kept, &obs.indices, settings.symmetry_tolerance)?;

        let y = DVector::from_vec(obs.values);
        let k_kr = linalg::block(&self.k, &kept, &obs.indices);
        let k_rr = linalg::block(&self.k, &obs.indices, &obs.indices);
        let h_r = linalg::entries(&self.h, &obs.indices);

        let h = linalg::entries(&self.h, &kept) - &k_kr * &y;
        let g = self.g + h_r.dot(&y) - 0.5 * y.dot(&(&k_rr * &y));

        debug!(
            kept = kept.len(),
            reduced = obs.indices.len(),
            "reduced canonical factor"
        );
        self.k = linalg::block(&self.k, &kept, &kept);
        self.h = h;
        self.g = g;
        self.scope = take(&self.scope, &kept);
        self.density = None;
        Ok(())
    }

    /// Integrates `vars` out, returning a new factor over the rest.
    ///
    /// Uses the default numeric settings.
    pub fn marginalize<Q>(&self, vars: &[&Q]) -> Result<Self>
    where
        V: Borrow<Q>,
        Q: Eq + fmt::Debug + ?Sized,
    {
        self.marginalize_with(vars, &NumericsSettings::default())
    }

    /// Integrates `vars` out in place.
    pub fn marginalize_in_place<Q>(&mut self, vars: &[&Q]) -> Result<()>
    where
        V: Borrow<Q>,
        Q: Eq + fmt::Debug + ?Sized,
    {
        self.marginalize_in_place_with(vars, &NumericsSettings::default())
    }

    pub fn marginalize_with<Q>(&self, vars: &[&Q], settings: &NumericsSettings) -> Result<Self>
    where
        V: Borrow<Q>,
        Q: Eq + fmt::Debug + ?Sized,
    {
        let mut marginal = self.clone();
        marginal.marginalize_in_place_with(vars, settings)?;
        Ok(marginal)
    }

    /// Integrates `vars` (`y`) out in place, keeping `x`:
    ///
    /// ```text
    /// K' = K_xx − K_xy K_yy⁻¹ K_yx
    /// h' = h_x − K_xy K_yy⁻¹ h_y
    /// g' = g + ½ (|y| ln 2π − ln|K_yy| + h_yᵀ K_yy⁻¹ h_y)
    /// ```
    ///
    /// The blocks `K_yy` and `K_xy` must be symmetric within
    /// `settings.symmetry_tolerance` ([`FactorError::AsymmetricPrecision`]),
    /// and the integral only exists for positive definite `K_yy`; anything
    /// else fails with [`FactorError::NotPositiveDefinite`]. On error `self`
    /// is left unchanged.
    pub fn marginalize_in_place_with<Q>(
        &mut self,
        vars: &[&Q],
        settings: &NumericsSettings,
    ) -> Result<()>
    where
        V: Borrow<Q>,
        Q: Eq + fmt::Debug + ?Sized,
    {
        let removed = scope::sorted_positions(&self.scope, vars)?;
        let kept = scope::complement(self.dim(), &removed);
        let tol = settings.symmetry_tolerance;
        linalg::check_symmetric_blocks(&self.k, &removed, &removed, tol)?;
        linalg::check_symmetric_blocks(&self.k, &kept, &removed, tol)?;

        let k_yy = linalg::block(&self.k, &removed, &removed);
        let chol = linalg::cholesky(&k_yy, "marginalized precision block")?;
        let k_xy = linalg::block(&self.k, &kept, &removed);
        let k_yx = linalg::block(&self.k, &removed, &kept);
        let h_y = linalg::entries(&self.h, &removed);
        let k_yy_inv_h_y = chol.solve(&h_y);

        let k = linalg::block(&self.k, &kept, &kept) - &k_xy * chol.solve(&k_yx);
        let h = linalg::entries(&self.h, &kept) - &k_xy * &k_yy_inv_h_y;
        let g = self.g
            + 0.5 * (removed.len() as f64 * LN_2PI - linalg::ln_det(&chol) + h_y.dot(&k_yy_inv_h_y));

        debug!(
            kept = kept.len(),
            removed = removed.len(),
            "marginalized canonical factor"
        );
        self.k = k;
        self.h = h;
        self.g = g;
        self.scope = take(&self.scope, &kept);
        self.density = None;
        Ok(())
    }

    /// Factor product over the union of both scopes (this factor's
    /// variables first, then the other's new ones).
    pub fn product(&self, other: &Self) -> Result<Self> {
        let mut scope = self.scope.clone();
        let positions: Vec<usize> = other
            .scope
            .iter()
            .map(|var| match self.scope.iter().position(|v| v == var) {
                Some(i) => i,
                None => {
                    scope.push(var.clone());
                    scope.len() - 1
                }
            })
            .collect();
        let n = scope.len();
        let own: Vec<usize> = (0..self.dim()).collect();

        let k = linalg::embed_matrix(&self.k, &own, n) + linalg::embed_matrix(&other.k, &positions, n);
        let h = linalg::embed_vector(&self.h, &own, n) + linalg::embed_vector(&other.h, &positions, n);
        debug!(left = self.dim(), right = other.dim(), dim = n, "multiplied canonical factors");
        Self::new(scope, k, h, self.g + other.g)
    }

    /// Factor division; `other`'s scope must be contained in this one's.
    pub fn divide(&self, other: &Self) -> Result<Self> {
        let positions = other
            .scope
            .iter()
            .map(|var| {
                self.scope
                    .iter()
                    .position(|v| v == var)
                    .ok_or_else(|| FactorError::ScopeNotSubset(format!("{:?}", var)))
            })
            .collect::<Result<Vec<_>>>()?;
        let n = self.dim();

        let k = &self.k - linalg::embed_matrix(&other.k, &positions, n);
        let h = &self.h - linalg::embed_vector(&other.h, &positions, n);
        debug!(left = n, right = other.dim(), "divided canonical factors");
        Self::new(self.scope.clone(), k, h, self.g - other.g)
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

fn check_shapes(n: usize, k: &DMatrix<f64>, h: &DVector<f64>) -> Result<()> {
    if h.len() != n {
        return Err(FactorError::ShapeMismatch {
            parameter: "h",
            expected: n.to_string(),
            actual: h.len().to_string(),
        });
    }
    if k.shape() != (n, n) {
        return Err(FactorError::ShapeMismatch {
            parameter: "K",
            expected: format!("({}, {})", n, n),
            actual: format!("({}, {})", k.nrows(), k.ncols()),
        });
    }
    Ok(())
}

fn take<V: Clone>(scope: &[V], indices: &[usize]) -> Vec<V> {
    indices.iter().map(|&i| scope[i].clone()).collect()
}
