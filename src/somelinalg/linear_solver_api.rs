//! Choice of direct solver for the banded systems of the finite-difference schemes.
//!
//! All solvers answer the same question (x with A x = b, or `SingularSystem`) and agree to
//! round-off; they differ in cost:
//! - `Thomas`: O(n), tridiagonal only. Matrices with one-sided boundary rows are first
//!   brought to tridiagonal form with [`BandMatrix::reduce_to_tridiagonal`].
//! - `BandLU`: O(n kl (kl + ku)), any bandwidth, partial pivoting.
//! - `DenseLU`: O(n^3) with an n x n copy of the matrix, for small systems and cross-checks.
use crate::numerical::BVP_errors::BVPError;
use crate::somelinalg::band_matrix::BandMatrix;
use crate::somelinalg::thomas::{thomas_solve, PIVOT_TOLERANCE};
use crate::somelinalg::RustedLINPACK::lu_band_nalg::BandLU;
use log::{debug, error};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LinearSolverKind {
    #[default]
    Thomas,
    #[serde(rename = "band_lu")]
    #[strum(serialize = "band_lu")]
    BandLU,
    #[serde(rename = "dense_lu")]
    #[strum(serialize = "dense_lu")]
    DenseLU,
}

/// Capability of solving A x = b for a banded A.
pub trait LinearSolver {
    fn solve(&self, matrix: &BandMatrix, rhs: &DVector<f64>) -> Result<DVector<f64>, BVPError>;
}

impl LinearSolver for LinearSolverKind {
    fn solve(&self, matrix: &BandMatrix, rhs: &DVector<f64>) -> Result<DVector<f64>, BVPError> {
        if rhs.len() != matrix.n() {
            return Err(BVPError::invalid(format!(
                "right-hand side of length {} for a system of order {}",
                rhs.len(),
                matrix.n()
            )));
        }
        debug!(
            "solving system of order {} (bandwidths {:?}) with {}",
            matrix.n(),
            matrix.bandwidths(),
            self
        );
        match self {
            LinearSolverKind::Thomas => {
                let (kl, ku) = matrix.bandwidths();
                if kl <= 1 && ku <= 1 {
                    let (sub, diag, sup) = matrix.tridiagonal_parts()?;
                    thomas_solve(&sub, &diag, &sup, rhs)
                } else {
                    let mut reduced_rhs = rhs.clone_owned();
                    let reduced = matrix.reduce_to_tridiagonal(&mut reduced_rhs)?;
                    let (sub, diag, sup) = reduced.tridiagonal_parts()?;
                    thomas_solve(&sub, &diag, &sup, &reduced_rhs)
                }
            }
            LinearSolverKind::BandLU => BandLU::new(matrix)?.solve(rhs),
            LinearSolverKind::DenseLU => dense_lu_solve(matrix, rhs),
        }
    }
}

/// Dense LU with partial pivoting from nalgebra.
pub fn dense_lu_solve(matrix: &BandMatrix, rhs: &DVector<f64>) -> Result<DVector<f64>, BVPError> {
    let n = matrix.n();
    let smallest_row_scale = (0..n).map(|i| matrix.row_scale(i)).fold(f64::INFINITY, f64::min);
    let lu = matrix.to_dense().lu();
    let u = lu.u();
    let threshold = PIVOT_TOLERANCE * smallest_row_scale;
    if let Some(i) = (0..n).find(|&i| u[(i, i)].abs() <= threshold || !u[(i, i)].is_finite()) {
        error!("zero pivot {:e} at position {} of dense LU", u[(i, i)], i);
        return Err(BVPError::SingularSystem(format!(
            "zero pivot {:e} at position {} (threshold {:e})",
            u[(i, i)],
            i,
            threshold
        )));
    }
    lu.solve(rhs)
        .ok_or_else(|| BVPError::SingularSystem("dense LU solve failed".to_string()))
}

/// Solves a banded system with the chosen solver.
pub fn solve_banded_system(
    kind: LinearSolverKind,
    matrix: &BandMatrix,
    rhs: &DVector<f64>,
) -> Result<DVector<f64>, BVPError> {
    kind.solve(matrix, rhs)
}
