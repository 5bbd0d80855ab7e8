//! u_xx = f(x) on [a, b] with Dirichlet or Neumann conditions at each end.
//!
//! All N + 2 grid values, boundaries included, are unknowns. Interior rows carry the
//! central stencil [1, -2, 1]/dx². A boundary row is either the identity (Dirichlet) or a
//! one-sided second-order first-derivative stencil (Neumann):
//! - left end: [-3, 4, -1]/(2 dx) at columns 0, 1, 2
//! - right end: [1, -4, 3]/(2 dx) at columns N-1, N, N+1
//!
//! These rows reach one column outside the tridiagonal band, so the matrix is stored with
//! two sub- and two super-diagonals.
use crate::numerical::BVP_errors::BVPError;
use crate::numerical::FD_BVP::FD_api::FDSolution;
use crate::numerical::FD_BVP::grid_api::UniformGrid;
use crate::numerical::boundary_conditions::{BoundaryCondition, BoundaryConditionType};
use crate::somelinalg::band_matrix::BandMatrix;
use crate::somelinalg::linear_solver_api::{LinearSolverKind, solve_banded_system};
use log::{debug, error, info};
use nalgebra::DVector;

/// Assembles the (N+2) x (N+2) ghost-point system.
pub fn assemble_mixed<S>(
    grid: &UniformGrid,
    source: &S,
    left: &BoundaryCondition,
    right: &BoundaryCondition,
) -> Result<(BandMatrix, DVector<f64>), BVPError>
where
    S: Fn(f64) -> f64,
{
    let n = grid.n_total();
    let last = n - 1;
    let dx = grid.dx;
    let inv_dx2 = 1.0 / (dx * dx);
    let mut matrix = BandMatrix::zeros(n, 2, 2);
    let mut rhs = DVector::zeros(n);

    for i in 1..last {
        matrix.set(i, i - 1, inv_dx2)?;
        matrix.set(i, i, -2.0 * inv_dx2)?;
        matrix.set(i, i + 1, inv_dx2)?;
        rhs[i] = source(grid.point(i));
    }

    match left.bc_type {
        BoundaryConditionType::Dirichlet => {
            matrix.set(0, 0, 1.0)?;
        }
        BoundaryConditionType::Neumann => {
            matrix.set(0, 0, -3.0 / (2.0 * dx))?;
            matrix.set(0, 1, 4.0 / (2.0 * dx))?;
            matrix.set(0, 2, -1.0 / (2.0 * dx))?;
        }
    }
    rhs[0] = left.value;

    match right.bc_type {
        BoundaryConditionType::Dirichlet => {
            matrix.set(last, last, 1.0)?;
        }
        BoundaryConditionType::Neumann => {
            matrix.set(last, last - 2, 1.0 / (2.0 * dx))?;
            matrix.set(last, last - 1, -4.0 / (2.0 * dx))?;
            matrix.set(last, last, 3.0 / (2.0 * dx))?;
        }
    }
    rhs[last] = right.value;
    debug!(
        "assembled {} equations, left {:?}, right {:?}, dx = {:e}",
        n, left.bc_type, right.bc_type, dx
    );
    Ok((matrix, rhs))
}

pub fn solve_mixed_fd<S>(
    source: S,
    a: f64,
    b: f64,
    left: BoundaryCondition,
    right: BoundaryCondition,
    n_interior: usize,
    linear_solver: LinearSolverKind,
) -> Result<FDSolution, BVPError>
where
    S: Fn(f64) -> f64,
{
    solve_mixed_fd_inspected(source, a, b, left, right, n_interior, linear_solver, |_, _| {})
}

/// Same as [`solve_mixed_fd`]; `inspect` sees the assembled system before it is solved.
#[allow(clippy::too_many_arguments)]
pub fn solve_mixed_fd_inspected<S, I>(
    source: S,
    a: f64,
    b: f64,
    left: BoundaryCondition,
    right: BoundaryCondition,
    n_interior: usize,
    linear_solver: LinearSolverKind,
    inspect: I,
) -> Result<FDSolution, BVPError>
where
    S: Fn(f64) -> f64,
    I: FnOnce(&BandMatrix, &DVector<f64>),
{
    left.validate("left")?;
    right.validate("right")?;
    let grid = UniformGrid::new(a, b, n_interior)?;
    if !left.is_dirichlet() && !right.is_dirichlet() {
        // u + const solves the same problem
        error!("Neumann conditions at both ends leave the solution defined up to a constant");
        return Err(BVPError::SingularSystem(
            "Neumann conditions at both ends: the operator has constants in its kernel".to_string(),
        ));
    }
    let (matrix, rhs) = assemble_mixed(&grid, &source, &left, &right)?;
    inspect(&matrix, &rhs);
    let u = solve_banded_system(linear_solver, &matrix, &rhs)?;
    info!(
        "mixed finite-difference problem solved on {} points with {}",
        grid.n_total(),
        linear_solver
    );
    Ok(FDSolution {
        x: grid.all_points(),
        u,
        dx: grid.dx,
    })
}
