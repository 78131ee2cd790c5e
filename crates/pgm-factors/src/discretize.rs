//! Discretization of univariate continuous distributions.
//!
//! A discretizer turns a cumulative distribution function into a list of
//! probability masses on a regular grid `frm, frm + step, …, < to`.

use pgm_config::DiscretizeSettings;
use pgm_math::normal_cdf;

use crate::error::DiscretizeError;

/// Largest number of grid points a discretizer may produce.
pub const MAX_GRID_POINTS: usize = 1 << 20;

/// Anything with a cumulative distribution function.
pub trait CumulativeDistribution {
    fn cdf(&self, x: f64) -> f64;
}

impl<F> CumulativeDistribution for F
where
    F: Fn(f64) -> f64,
{
    fn cdf(&self, x: f64) -> f64 {
        self(x)
    }
}

/// Univariate normal `N(mean, std_dev²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnivariateNormal {
    mean: f64,
    std_dev: f64,
}

impl UnivariateNormal {
    pub fn new(mean: f64, std_dev: f64) -> Result<Self, DiscretizeError> {
        if !mean.is_finite() {
            return Err(DiscretizeError::InvalidParameter {
                name: "mean",
                reason: format!("must be finite, got {}", mean),
            });
        }
        if !(std_dev.is_finite() && std_dev > 0.0) {
            return Err(DiscretizeError::InvalidParameter {
                name: "std_dev",
                reason: format!("must be positive and finite, got {}", std_dev),
            });
        }
        Ok(Self { mean, std_dev })
    }

    pub fn standard() -> Self {
        Self {
            mean: 0.0,
            std_dev: 1.0,
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }
}

impl CumulativeDistribution for UnivariateNormal {
    fn cdf(&self, x: f64) -> f64 {
        normal_cdf(x, self.mean, self.std_dev)
    }
}

/// A method for assigning probability mass to grid points.
pub trait Discretizer {
    /// Probability mass for each grid point.
    fn discrete_values(&self, distribution: &dyn CumulativeDistribution) -> Vec<f64>;

    /// Human-readable label for each grid interval.
    fn labels(&self) -> Vec<String>;
}

/// Rounding method: each point gets the mass of the half-step window around
/// it, `cdf(x + step/2) − cdf(x − step/2)`, except the first point, which
/// only collects `cdf(frm + step/2) − cdf(frm)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundingDiscretizer {
    frm: f64,
    to: f64,
    step: f64,
}

impl RoundingDiscretizer {
    pub fn new(frm: f64, to: f64, step: f64) -> Result<Self, DiscretizeError> {
        if !(frm.is_finite() && to.is_finite() && frm < to) {
            return Err(DiscretizeError::InvalidRange { frm, to });
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(DiscretizeError::InvalidStep(step));
        }
        let points = ((to - frm) / step).ceil();
        if points > MAX_GRID_POINTS as f64 {
            return Err(DiscretizeError::GridTooLarge {
                points,
                max: MAX_GRID_POINTS,
            });
        }
        Ok(Self { frm, to, step })
    }

    pub fn from_settings(settings: &DiscretizeSettings) -> Result<Self, DiscretizeError> {
        Self::new(settings.frm, settings.to, settings.step)
    }

    pub fn frm(&self) -> f64 {
        self.frm
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

impl Discretizer for RoundingDiscretizer {
    fn discrete_values(&self, distribution: &dyn CumulativeDistribution) -> Vec<f64> {
        let half = self.step / 2.0;
        let mut values = vec![distribution.cdf(self.frm + half) - distribution.cdf(self.frm)];
        values.extend(
            grid(self.frm + self.step, self.to, self.step)
                .map(|x| distribution.cdf(x + half) - distribution.cdf(x - half)),
        );
        values
    }

    fn labels(&self) -> Vec<String> {
        grid(self.frm, self.to, self.step)
            .map(|a| format!("x=[{},{})", a, a + self.step))
            .collect()
    }
}

/// Points `start + i·step` for `i < ceil((stop − start) / step)`.
fn grid(start: f64, stop: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = ((stop - start) / step).ceil().max(0.0) as usize;
    (0..count).map(move |i| start + i as f64 * step)
}
