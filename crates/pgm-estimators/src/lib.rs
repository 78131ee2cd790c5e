//! Conditional independence tests over tabular data.
//!
//! - [`data::DataSet`]: named numeric columns of equal length.
//! - [`ci_tests`]: chi-square (discrete) and Pearson (continuous) tests of
//!   `X ⟂ Y | Z`, plus a settings-driven dispatcher.
//! - [`independence`]: independence assertions and lookup, for running
//!   structure learning against a known oracle instead of data.

pub mod ci_tests;
pub mod data;
pub mod error;
pub mod independence;

pub use ci_tests::{
    chi_square, chi_square_with_states, independence_test, pearsonr, run_ci_test, ChiSquareOutcome,
    CiTestOutcome, PearsonOutcome, StateNames, MAX_TABLE_CELLS,
};
pub use data::DataSet;
pub use error::{EstimatorError, Result};
pub use independence::{independence_match, IndependenceAssertion, Independencies};
