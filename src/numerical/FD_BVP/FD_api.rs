//! # Finite-difference solvers for linear two-point BVPs
//!
//! Solves u_xx = f(x) on a uniform grid with second-order central differences.
//! - [`FiniteDifferenceSolver::solve_dirichlet`]: u(a) and u(b) known, boundary values are
//!   eliminated and only the N interior values are solved for.
//! - [`FiniteDifferenceSolver::solve_mixed`]: each end is Dirichlet or Neumann, all N + 2
//!   values are unknowns and boundary rows are overwritten with the boundary equations.
//!
//! The linear systems are banded and solved in O(N) by default (Thomas algorithm).
//! ## Example
//! ```rust, ignore
//! use RustedBVP::numerical::FD_BVP::FD_api::FiniteDifferenceSolver;
//! use RustedBVP::somelinalg::linear_solver_api::LinearSolverKind;
//! let solver = FiniteDifferenceSolver::new(100, LinearSolverKind::Thomas);
//! let solution = solver.solve_dirichlet(|x: f64| x.exp(), 0.0, 1.0, 0.0, 3.0).unwrap();
//! assert_eq!(solution.u[0], 0.0);
//! ```
use crate::numerical::BVP_errors::BVPError;
use crate::numerical::FD_BVP::FD_dirichlet::solve_dirichlet_fd_inspected;
use crate::numerical::FD_BVP::FD_mixed::solve_mixed_fd_inspected;
use crate::numerical::boundary_conditions::BoundaryCondition;
use crate::somelinalg::band_matrix::BandMatrix;
use crate::somelinalg::linear_solver_api::LinearSolverKind;
use crate::somelinalg::linear_sys_diagnostics::linear_system_diagnostics;
use crate::Utils::config::FiniteDifferenceConfig;
use crate::Utils::logger::save_matrix_to_csv;
use crate::Utils::tables::solution_table;
use log::warn;
use nalgebra::{DMatrix, DVector};
use std::path::Path;

/// above this order the dense diagnostics are skipped
const MAX_DIAGNOSTICS_ORDER: usize = 2000;
const CONDITION_THRESHOLD: f64 = 1e12;

/// Grid values of a finite-difference solution, boundaries included.
#[derive(Debug, Clone, PartialEq)]
pub struct FDSolution {
    pub x: DVector<f64>,
    pub u: DVector<f64>,
    pub dx: f64,
}

impl FDSolution {
    /// max_i |u_i - exact(x_i)|
    pub fn max_error<E: Fn(f64) -> f64>(&self, exact: E) -> f64 {
        self.x
            .iter()
            .zip(self.u.iter())
            .map(|(&x, &u)| (u - exact(x)).abs())
            .fold(0.0, f64::max)
    }

    pub fn to_table(&self) -> String {
        let y = DMatrix::from_column_slice(self.u.len(), 1, self.u.as_slice());
        solution_table("x", &["u".to_string()], &self.x, &y)
    }

    pub fn save_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), BVPError> {
        let y = DMatrix::from_column_slice(self.u.len(), 1, self.u.as_slice());
        save_matrix_to_csv(&y, &["u".to_string()], path, &self.x, "x")
    }
}

/// Finite-difference solver settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiniteDifferenceSolver {
    /// number of interior grid points N
    pub n_interior: usize,
    pub linear_solver: LinearSolverKind,
    /// log rank and condition number of the assembled matrix (dense, small N only)
    pub diagnostics: bool,
}

impl Default for FiniteDifferenceSolver {
    fn default() -> Self {
        Self::from_config(&FiniteDifferenceConfig::default())
    }
}

impl FiniteDifferenceSolver {
    pub fn new(n_interior: usize, linear_solver: LinearSolverKind) -> Self {
        FiniteDifferenceSolver {
            n_interior,
            linear_solver,
            diagnostics: false,
        }
    }

    pub fn from_config(config: &FiniteDifferenceConfig) -> Self {
        FiniteDifferenceSolver {
            n_interior: config.n_interior,
            linear_solver: config.linear_solver,
            diagnostics: config.diagnostics,
        }
    }

    pub fn with_n_interior(&self, n_interior: usize) -> Self {
        FiniteDifferenceSolver { n_interior, ..*self }
    }

    fn run_diagnostics(&self, matrix: &BandMatrix, rhs: &DVector<f64>) {
        if !self.diagnostics {
            return;
        }
        if matrix.n() > MAX_DIAGNOSTICS_ORDER {
            warn!(
                "system of order {} is too large for dense diagnostics, skipped",
                matrix.n()
            );
            return;
        }
        let report = linear_system_diagnostics(&matrix.to_dense(), rhs, CONDITION_THRESHOLD);
        if !report.solvable || report.poorly_conditioned {
            warn!("assembled system may not be reliably solvable: {:?}", report);
        }
    }

    /// u_xx = source(x), u(a) = u_a, u(b) = u_b. Returns N + 2 values with u_a and u_b at the ends.
    pub fn solve_dirichlet<S>(&self, source: S, a: f64, b: f64, u_a: f64, u_b: f64) -> Result<FDSolution, BVPError>
    where
        S: Fn(f64) -> f64,
    {
        solve_dirichlet_fd_inspected(
            source,
            a,
            b,
            u_a,
            u_b,
            self.n_interior,
            self.linear_solver,
            |matrix, rhs| self.run_diagnostics(matrix, rhs),
        )
    }

    /// u_xx = source(x) with a Dirichlet or Neumann condition at each end.
    pub fn solve_mixed<S>(
        &self,
        source: S,
        a: f64,
        b: f64,
        left: BoundaryCondition,
        right: BoundaryCondition,
    ) -> Result<FDSolution, BVPError>
    where
        S: Fn(f64) -> f64,
    {
        solve_mixed_fd_inspected(
            source,
            a,
            b,
            left,
            right,
            self.n_interior,
            self.linear_solver,
            |matrix, rhs| self.run_diagnostics(matrix, rhs),
        )
    }
}
