//! Conditional independence tests for `X ⟂ Y | Z`.
//!
//! Each test returns its statistic and p-value; the null hypothesis is
//! independence, so `p_value >= significance_level` means "independent".
//!
//! - [`chi_square`]: discrete data. Expected counts under independence are
//!   `N(x,z)·N(y,z)/N(z)`; cells with zero expectation are dropped.
//! - [`pearsonr`]: continuous data. With a non-empty `Z`, both variables
//!   are regressed on `Z` (least squares, no intercept) and the residuals
//!   are correlated.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector, Dyn, SVD};
use pgm_config::{CiTestMethod, CiTestSettings};
use pgm_math::{chi_square_sf, student_t_two_sided_p};
use tracing::{debug, warn};

use crate::data::DataSet;
use crate::error::{EstimatorError, Result};

/// Explicit state lists per variable, overriding the states seen in data.
pub type StateNames = HashMap<String, Vec<f64>>;

/// Largest contingency table (product of all state counts) a chi-square
/// test will build.
pub const MAX_TABLE_CELLS: usize = 1 << 24;

/// Result of a chi-square test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareOutcome {
    pub statistic: f64,
    pub p_value: f64,
    /// Degrees of freedom: retained cells minus one.
    pub dof: usize,
    /// Whether the data meets the minimum rows-per-parameter requirement.
    pub sufficient_data: bool,
}

impl ChiSquareOutcome {
    pub fn is_independent(&self, significance_level: f64) -> bool {
        self.p_value >= significance_level
    }
}

/// Result of a (partial) Pearson correlation test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PearsonOutcome {
    pub coefficient: f64,
    pub p_value: f64,
}

impl PearsonOutcome {
    pub fn is_independent(&self, significance_level: f64) -> bool {
        self.p_value >= significance_level
    }
}

/// Outcome of whichever test the settings select.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CiTestOutcome {
    ChiSquare(ChiSquareOutcome),
    Pearsonr(PearsonOutcome),
}

impl CiTestOutcome {
    pub fn p_value(&self) -> f64 {
        match self {
            CiTestOutcome::ChiSquare(outcome) => outcome.p_value,
            CiTestOutcome::Pearsonr(outcome) => outcome.p_value,
        }
    }

    pub fn is_independent(&self, significance_level: f64) -> bool {
        self.p_value() >= significance_level
    }
}

/// Runs the test selected by `settings.method`.
pub fn run_ci_test(
    x: &str,
    y: &str,
    z: &[&str],
    data: &DataSet,
    settings: &CiTestSettings,
) -> Result<CiTestOutcome> {
    match settings.method {
        CiTestMethod::ChiSquare => chi_square(x, y, z, data, settings).map(CiTestOutcome::ChiSquare),
        CiTestMethod::Pearsonr => pearsonr(x, y, z, data).map(CiTestOutcome::Pearsonr),
    }
}

/// Boolean form of [`run_ci_test`] at `settings.significance_level`.
pub fn independence_test(
    x: &str,
    y: &str,
    z: &[&str],
    data: &DataSet,
    settings: &CiTestSettings,
) -> Result<bool> {
    let outcome = run_ci_test(x, y, z, data, settings)?;
    Ok(outcome.is_independent(settings.significance_level))
}

/// Chi-square test with states taken from the data.
pub fn chi_square(
    x: &str,
    y: &str,
    z: &[&str],
    data: &DataSet,
    settings: &CiTestSettings,
) -> Result<ChiSquareOutcome> {
    chi_square_with_states(x, y, z, data, None, settings)
}

/// Chi-square test over the full product of each variable's states.
///
/// Variables missing from `state_names` use the distinct values in the
/// data. Rows holding a value outside a variable's states are not counted.
pub fn chi_square_with_states(
    x: &str,
    y: &str,
    z: &[&str],
    data: &DataSet,
    state_names: Option<&StateNames>,
    settings: &CiTestSettings,
) -> Result<ChiSquareOutcome> {
    let vars: Vec<&str> = [x, y].into_iter().chain(z.iter().copied()).collect();
    let columns = vars
        .iter()
        .map(|var| data.column(var))
        .collect::<Result<Vec<_>>>()?;
    let states = vars
        .iter()
        .map(|var| match state_names.and_then(|names| names.get(*var)) {
            Some(states) => Ok(states.clone()),
            None => data.states(var),
        })
        .collect::<Result<Vec<_>>>()?;

    let cards: Vec<usize> = states.iter().map(Vec::len).collect();
    let table_size = cards
        .iter()
        .try_fold(1usize, |acc, &card| acc.checked_mul(card))
        .filter(|&cells| cells <= MAX_TABLE_CELLS)
        .ok_or(EstimatorError::TableTooLarge {
            variables: cards.len(),
            max_cells: MAX_TABLE_CELLS,
        })?;
    let (cx, cy) = (cards[0], cards[1]);
    let cz: usize = cards[2..].iter().product();
    let n = data.len();

    let num_params = cx.saturating_sub(1) * cy.saturating_sub(1) * cz;
    let needed = (settings.min_samples_per_param as usize).saturating_mul(num_params);
    let sufficient_data = n >= needed;
    if !sufficient_data {
        warn!(
            x,
            y,
            z = ?z,
            needed,
            actual = n,
            "insufficient data for chi-square independence test"
        );
    }

    // observed[(xi·cy + yi)·cz + zi]
    let mut observed = vec![0.0f64; table_size];
    let mut coords = Vec::with_capacity(vars.len());
    'rows: for row in 0..n {
        coords.clear();
        for (column, var_states) in columns.iter().zip(&states) {
            match state_index(var_states, column[row]) {
                Some(i) => coords.push(i),
                None => continue 'rows,
            }
        }
        let zi = coords[2..]
            .iter()
            .zip(&cards[2..])
            .fold(0, |acc, (&i, &card)| acc * card + i);
        observed[(coords[0] * cy + coords[1]) * cz + zi] += 1.0;
    }

    let mut n_xz = vec![0.0f64; cx * cz];
    let mut n_yz = vec![0.0f64; cy * cz];
    let mut n_z = vec![0.0f64; cz];
    for xi in 0..cx {
        for yi in 0..cy {
            for zi in 0..cz {
                let count = observed[(xi * cy + yi) * cz + zi];
                n_xz[xi * cz + zi] += count;
                n_yz[yi * cz + zi] += count;
                n_z[zi] += count;
            }
        }
    }

    let mut statistic = 0.0;
    let mut cells = 0usize;
    for xi in 0..cx {
        for yi in 0..cy {
            for zi in 0..cz {
                if n_z[zi] == 0.0 {
                    continue;
                }
                let expected = n_xz[xi * cz + zi] * n_yz[yi * cz + zi] / n_z[zi];
                if expected == 0.0 {
                    continue;
                }
                let diff = observed[(xi * cy + yi) * cz + zi] - expected;
                statistic += diff * diff / expected;
                cells += 1;
            }
        }
    }
    if cells == 0 {
        return Err(EstimatorError::InsufficientData {
            needed: needed.max(1),
            actual: n,
        });
    }

    let dof = cells - 1;
    let p_value = if dof == 0 {
        1.0
    } else {
        chi_square_sf(statistic, dof as f64)
    };
    debug!(x, y, z = ?z, statistic, p_value, dof, "chi-square test");
    Ok(ChiSquareOutcome {
        statistic,
        p_value,
        dof,
        sufficient_data,
    })
}

/// Pearson correlation of `x` and `y`, partial on `z` when non-empty.
///
/// The p-value is two-sided, from Student's t with `n − 2` degrees of
/// freedom. Two rows always give `p = 1`.
pub fn pearsonr(x: &str, y: &str, z: &[&str], data: &DataSet) -> Result<PearsonOutcome> {
    let xs = data.column(x)?;
    let ys = data.column(y)?;
    let n = data.len();
    if n < 2 {
        return Err(EstimatorError::InsufficientData {
            needed: 2,
            actual: n,
        });
    }

    let (rx, ry) = if z.is_empty() {
        (DVector::from_column_slice(xs), DVector::from_column_slice(ys))
    } else {
        let given = z
            .iter()
            .map(|var| data.column(var))
            .collect::<Result<Vec<_>>>()?;
        let design = DMatrix::from_fn(n, given.len(), |row, col| given[col][row]);
        let svd = design.clone().svd(true, true);
        (
            residuals(&design, &svd, xs)?,
            residuals(&design, &svd, ys)?,
        )
    };

    let coefficient = correlation(&rx, &ry, x, y)?;
    let p_value = if n == 2 {
        1.0
    } else if coefficient.abs() >= 1.0 {
        0.0
    } else {
        let dof = (n - 2) as f64;
        let t = coefficient * (dof / ((1.0 - coefficient) * (1.0 + coefficient))).sqrt();
        student_t_two_sided_p(t, dof)
    };
    debug!(x, y, z = ?z, coefficient, p_value, "pearson test");
    Ok(PearsonOutcome {
        coefficient,
        p_value,
    })
}

fn state_index(states: &[f64], value: f64) -> Option<usize> {
    states.iter().position(|s| s.total_cmp(&value).is_eq())
}

/// `target − design · β` for the least-squares `β`, with the same singular
/// value cutoff as LAPACK's default `rcond`.
fn residuals(design: &DMatrix<f64>, svd: &SVD<f64, Dyn, Dyn>, target: &[f64]) -> Result<DVector<f64>> {
    let b = DVector::from_column_slice(target);
    let max_sv = svd.singular_values.max();
    let eps = f64::EPSILON * design.nrows().max(design.ncols()) as f64 * max_sv;
    let beta = svd
        .solve(&b, eps)
        .map_err(|err| EstimatorError::Regression(err.to_string()))?;
    Ok(b - design * beta)
}

fn correlation(a: &DVector<f64>, b: &DVector<f64>, a_name: &str, b_name: &str) -> Result<f64> {
    let da = a.add_scalar(-a.mean());
    let db = b.add_scalar(-b.mean());
    let (ssa, ssb) = (da.norm_squared(), db.norm_squared());
    if ssa == 0.0 {
        return Err(EstimatorError::ConstantInput(a_name.to_string()));
    }
    if ssb == 0.0 {
        return Err(EstimatorError::ConstantInput(b_name.to_string()));
    }
    Ok((da.dot(&db) / (ssa * ssb).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn repeat(pattern: &[f64], times: usize) -> Vec<f64> {
        pattern.iter().copied().cycle().take(pattern.len() * times).collect()
    }

    #[test]
    fn chi_square_balanced_table_is_independent() {
        let data = DataSet::from_columns([
            ("X", repeat(&[0.0, 0.0, 1.0, 1.0], 10)),
            ("Y", repeat(&[0.0, 1.0, 0.0, 1.0], 10)),
        ])
        .unwrap();
        let outcome = chi_square("X", "Y", &[], &data, &CiTestSettings::default()).unwrap();
        assert_eq!(outcome.statistic, 0.0);
        assert_eq!(outcome.p_value, 1.0);
        assert_eq!(outcome.dof, 3);
        assert!(outcome.sufficient_data);
        assert!(outcome.is_independent(0.05));
    }

    #[test]
    fn chi_square_identical_columns_are_dependent() {
        let column = repeat(&[0.0, 1.0], 50);
        let data = DataSet::from_columns([("X", column.clone()), ("Y", column)]).unwrap();
        let outcome = chi_square("X", "Y", &[], &data, &CiTestSettings::default()).unwrap();
        assert!(approx_eq(outcome.statistic, 100.0, 1e-12));
        assert_eq!(outcome.p_value, chi_square_sf(outcome.statistic, 3.0));
        assert!(outcome.p_value < 1e-15);
        assert!(!outcome.is_independent(0.05));
    }

    #[test]
    fn chi_square_flags_small_samples() {
        let data = DataSet::from_columns([
            ("X", vec![0.0, 1.0, 0.0, 1.0]),
            ("Y", vec![0.0, 0.0, 1.0, 1.0]),
        ])
        .unwrap();
        let outcome = chi_square("X", "Y", &[], &data, &CiTestSettings::default()).unwrap();
        assert!(!outcome.sufficient_data);
    }

    #[test]
    fn chi_square_unseen_states_are_dropped() {
        let data = DataSet::from_columns([
            ("X", repeat(&[0.0, 0.0, 1.0, 1.0], 5)),
            ("Y", repeat(&[0.0, 1.0, 0.0, 1.0], 5)),
        ])
        .unwrap();
        let mut names = StateNames::new();
        names.insert("X".to_string(), vec![0.0, 1.0, 2.0]);
        let settings = CiTestSettings::default();
        let with_extra = chi_square_with_states("X", "Y", &[], &data, Some(&names), &settings).unwrap();
        let plain = chi_square("X", "Y", &[], &data, &settings).unwrap();
        assert_eq!(with_extra.statistic, plain.statistic);
        assert_eq!(with_extra.dof, plain.dof);
    }

    #[test]
    fn chi_square_conditioning_removes_dependence() {
        let z = repeat(&[0.0, 1.0], 30);
        let data =
            DataSet::from_columns([("X", z.clone()), ("Y", z.clone()), ("Z", z)]).unwrap();
        let settings = CiTestSettings::default();
        let given = chi_square("X", "Y", &["Z"], &data, &settings).unwrap();
        assert_eq!(given.statistic, 0.0);
        assert_eq!(given.dof, 1);
        assert!(given.is_independent(0.05));
        let marginal = chi_square("X", "Y", &[], &data, &settings).unwrap();
        assert!(!marginal.is_independent(0.05));
    }

    #[test]
    fn chi_square_unknown_column() {
        let data = DataSet::from_columns([("X", vec![0.0])]).unwrap();
        assert_eq!(
            chi_square("X", "Q", &[], &data, &CiTestSettings::default()),
            Err(EstimatorError::UnknownColumn("Q".into()))
        );
    }

    #[test]
    fn pearson_perfect_correlation() {
        let data = DataSet::from_columns([
            ("X", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("Y", vec![2.0, 4.0, 6.0, 8.0, 10.0]),
            ("W", vec![5.0, 4.0, 3.0, 2.0, 1.0]),
        ])
        .unwrap();
        let up = pearsonr("X", "Y", &[], &data).unwrap();
        assert!(approx_eq(up.coefficient, 1.0, 1e-15));
        assert_eq!(up.p_value, 0.0);
        let down = pearsonr("X", "W", &[], &data).unwrap();
        assert!(approx_eq(down.coefficient, -1.0, 1e-15));
    }

    #[test]
    fn pearson_matches_closed_form_p_value() {
        // r = 0.8 with n = 5; t-distribution with 3 dof has a closed-form CDF.
        let data = DataSet::from_columns([
            ("X", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("Y", vec![2.0, 1.0, 4.0, 3.0, 5.0]),
        ])
        .unwrap();
        let outcome = pearsonr("X", "Y", &[], &data).unwrap();
        assert!(approx_eq(outcome.coefficient, 0.8, 1e-12));
        let expected = 1.0 - 2.0 / PI * (0.48 + (4.0f64 / 3.0).atan());
        assert!(approx_eq(outcome.p_value, expected, 1e-10));
    }

    #[test]
    fn pearson_edge_cases() {
        let two = DataSet::from_columns([("X", vec![1.0, 2.0]), ("Y", vec![3.0, 1.0])]).unwrap();
        assert_eq!(pearsonr("X", "Y", &[], &two).unwrap().p_value, 1.0);

        let one = DataSet::from_columns([("X", vec![1.0]), ("Y", vec![3.0])]).unwrap();
        assert!(matches!(
            pearsonr("X", "Y", &[], &one),
            Err(EstimatorError::InsufficientData { needed: 2, actual: 1 })
        ));

        let flat = DataSet::from_columns([("X", vec![1.0, 2.0, 3.0]), ("Y", vec![7.0, 7.0, 7.0])])
            .unwrap();
        assert_eq!(
            pearsonr("X", "Y", &[], &flat),
            Err(EstimatorError::ConstantInput("Y".into()))
        );
    }

    #[test]
    fn dispatch_follows_settings() {
        let data = DataSet::from_columns([
            ("X", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("Y", vec![2.0, 1.0, 4.0, 3.0, 5.0]),
        ])
        .unwrap();
        let settings = CiTestSettings {
            method: CiTestMethod::Pearsonr,
            ..CiTestSettings::default()
        };
        let outcome = run_ci_test("X", "Y", &[], &data, &settings).unwrap();
        assert!(matches!(outcome, CiTestOutcome::Pearsonr(_)));
        assert!(independence_test("X", "Y", &[], &data, &settings).unwrap());
    }
}
