//! Dense linear-algebra helpers over `nalgebra` dynamic matrices.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};

use crate::error::{FactorError, Result};

/// Sub-matrix with the given row and column index sets (numpy `ix_`).
pub(crate) fn block(m: &DMatrix<f64>, rows: &[usize], cols: &[usize]) -> DMatrix<f64> {
    m.select_rows(rows.iter()).select_columns(cols.iter())
}

/// Entries of `v` at `rows`.
pub(crate) fn entries(v: &DVector<f64>, rows: &[usize]) -> DVector<f64> {
    v.select_rows(rows.iter())
}

/// Inverse of a square matrix; a singular matrix is an error.
pub(crate) fn invert(m: &DMatrix<f64>, what: &str) -> Result<DMatrix<f64>> {
    m.clone()
        .try_inverse()
        .ok_or_else(|| FactorError::SingularMatrix(format!("{} ({}x{})", what, m.nrows(), m.ncols())))
}

/// Cholesky factorization; fails unless the matrix is symmetric positive definite.
pub(crate) fn cholesky(m: &DMatrix<f64>, what: &str) -> Result<Cholesky<f64, Dyn>> {
    Cholesky::new(m.clone()).ok_or_else(|| {
        FactorError::NotPositiveDefinite(format!("{} ({}x{})", what, m.nrows(), m.ncols()))
    })
}

/// ln|A| from a Cholesky factor of A.
pub(crate) fn ln_det(chol: &Cholesky<f64, Dyn>) -> f64 {
    2.0 * chol.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<f64>()
}

/// Checks `m[(i, j)] == m[(j, i)]` for every `i` in `rows`, `j` in `cols`,
/// up to `tol` relative to the larger magnitude (absolute below 1).
pub(crate) fn check_symmetric_blocks(
    m: &DMatrix<f64>,
    rows: &[usize],
    cols: &[usize],
    tol: f64,
) -> Result<()> {
    for &i in rows {
        for &j in cols {
            let (a, b) = (m[(i, j)], m[(j, i)]);
            let deviation = (a - b).abs();
            if deviation > tol * a.abs().max(b.abs()).max(1.0) {
                return Err(FactorError::AsymmetricPrecision {
                    row: i,
                    col: j,
                    deviation,
                });
            }
        }
    }
    Ok(())
}

/// Interprets a 1×n or n×1 matrix as a column vector.
pub(crate) fn as_column(m: &DMatrix<f64>) -> Option<DVector<f64>> {
    if m.ncols() == 1 {
        Some(m.column(0).into_owned())
    } else if m.nrows() == 1 {
        Some(m.row(0).transpose())
    } else {
        None
    }
}

/// Embeds `m` (indexed by `positions` into an `n`-dimensional space) into a
/// zero `n×n` matrix.
pub(crate) fn embed_matrix(m: &DMatrix<f64>, positions: &[usize], n: usize) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(n, n);
    for (a, &i) in positions.iter().enumerate() {
        for (b, &j) in positions.iter().enumerate() {
            out[(i, j)] = m[(a, b)];
        }
    }
    out
}

/// Embeds `v` into a zero vector of length `n` at `positions`.
pub(crate) fn embed_vector(v: &DVector<f64>, positions: &[usize], n: usize) -> DVector<f64> {
    let mut out = DVector::zeros(n);
    for (a, &i) in positions.iter().enumerate() {
        out[i] = v[a];
    }
    out
}
