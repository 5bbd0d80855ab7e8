//! Second-order central differences for u_xx = f(x) with u(a) = u_a, u(b) = u_b.
//!
//! The boundary values are known, so they are eliminated: only the N interior values are
//! unknown and the system is tridiagonal with 1/dx², -2/dx², 1/dx² on its diagonals.
//! The known values enter the first and last right-hand side entries.
use crate::numerical::BVP_errors::BVPError;
use crate::numerical::FD_BVP::FD_api::FDSolution;
use crate::numerical::FD_BVP::grid_api::UniformGrid;
use crate::somelinalg::band_matrix::BandMatrix;
use crate::somelinalg::linear_solver_api::{LinearSolverKind, solve_banded_system};
use log::{debug, info};
use nalgebra::DVector;

/// Assembles the N x N interior system A U = rhs.
pub fn assemble_dirichlet<S>(
    grid: &UniformGrid,
    source: &S,
    u_a: f64,
    u_b: f64,
) -> Result<(BandMatrix, DVector<f64>), BVPError>
where
    S: Fn(f64) -> f64,
{
    let n = grid.n_interior;
    let inv_dx2 = 1.0 / (grid.dx * grid.dx);
    let mut matrix = BandMatrix::zeros(n, 1, 1);
    for i in 0..n {
        matrix.set(i, i, -2.0 * inv_dx2)?;
        if i > 0 {
            matrix.set(i, i - 1, inv_dx2)?;
        }
        if i + 1 < n {
            matrix.set(i, i + 1, inv_dx2)?;
        }
    }
    let x = grid.interior_points();
    let mut rhs = x.map(source);
    rhs[0] -= u_a * inv_dx2;
    rhs[n - 1] -= u_b * inv_dx2;
    debug!("assembled {} interior equations, dx = {:e}", n, grid.dx);
    Ok((matrix, rhs))
}

pub fn solve_dirichlet_fd<S>(
    source: S,
    a: f64,
    b: f64,
    u_a: f64,
    u_b: f64,
    n_interior: usize,
    linear_solver: LinearSolverKind,
) -> Result<FDSolution, BVPError>
where
    S: Fn(f64) -> f64,
{
    solve_dirichlet_fd_inspected(source, a, b, u_a, u_b, n_interior, linear_solver, |_, _| {})
}

/// Same as [`solve_dirichlet_fd`]; `inspect` sees the assembled system before it is solved.
#[allow(clippy::too_many_arguments)]
pub fn solve_dirichlet_fd_inspected<S, I>(
    source: S,
    a: f64,
    b: f64,
    u_a: f64,
    u_b: f64,
    n_interior: usize,
    linear_solver: LinearSolverKind,
    inspect: I,
) -> Result<FDSolution, BVPError>
where
    S: Fn(f64) -> f64,
    I: FnOnce(&BandMatrix, &DVector<f64>),
{
    if !u_a.is_finite() || !u_b.is_finite() {
        return Err(BVPError::invalid(format!(
            "boundary values must be finite, got u(a) = {}, u(b) = {}",
            u_a, u_b
        )));
    }
    let grid = UniformGrid::new(a, b, n_interior)?;
    let (matrix, rhs) = assemble_dirichlet(&grid, &source, u_a, u_b)?;
    inspect(&matrix, &rhs);
    let interior = solve_banded_system(linear_solver, &matrix, &rhs)?;

    let mut u = DVector::zeros(grid.n_total());
    u[0] = u_a;
    u.rows_mut(1, n_interior).copy_from(&interior);
    u[n_interior + 1] = u_b;
    info!(
        "Dirichlet finite-difference problem solved on {} points with {}",
        grid.n_total(),
        linear_solver
    );
    Ok(FDSolution {
        x: grid.all_points(),
        u,
        dx: grid.dx,
    })
}
