//! Univariate normal distribution helpers.
//!
//! The error function is evaluated through the regularized incomplete
//! gamma function, `erf(x) = sign(x) · P(1/2, x²)`, which keeps full
//! precision in both tails when the CDF is computed from `Q` below the mean.

use super::gamma::{gamma_p, gamma_q};
use super::stable::LN_2PI;

/// Error function.
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    let p = gamma_p(0.5, x * x);
    if x < 0.0 {
        -p
    } else {
        p
    }
}

/// Log density of N(mean, std_dev²) at x.
pub fn normal_log_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    if x.is_nan() || mean.is_nan() || std_dev.is_nan() || std_dev <= 0.0 {
        return f64::NAN;
    }
    let z = (x - mean) / std_dev;
    -0.5 * (LN_2PI + z * z) - std_dev.ln()
}

/// Density of N(mean, std_dev²) at x.
pub fn normal_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    let log_pdf = normal_log_pdf(x, mean, std_dev);
    if log_pdf.is_nan() {
        return f64::NAN;
    }
    log_pdf.exp()
}

/// CDF of N(mean, std_dev²) at x.
pub fn normal_cdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    if x.is_nan() || mean.is_nan() || std_dev.is_nan() || std_dev <= 0.0 {
        return f64::NAN;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    if x == f64::INFINITY {
        return 1.0;
    }
    let z = (x - mean) / std_dev;
    let half_z2 = 0.5 * z * z;
    if z < 0.0 {
        0.5 * gamma_q(0.5, half_z2)
    } else {
        0.5 + 0.5 * gamma_p(0.5, half_z2)
    }
}
