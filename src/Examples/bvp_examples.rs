#![allow(non_snake_case)]
use crate::numerical::BVP_errors::BVPError;
use crate::numerical::FD_BVP::FD_api::FiniteDifferenceSolver;
use crate::numerical::FD_BVP::FD_convergence::convergence_study;
use crate::numerical::ShootingBVP::Shooting_simple::{
    BoundaryCondition, BoundaryValueProblem, ShootingMethodSolver,
};
use crate::Utils::config::BVPConfig;
use crate::Utils::plots::plots;
use log::info;
use nalgebra::{DMatrix, DVector};
use std::f64::consts::{E, FRAC_PI_2};
use std::path::Path;

fn plot_fd(x: &DVector<f64>, u: &DVector<f64>, name: &str, plot_dir: Option<&Path>) -> Result<(), BVPError> {
    if let Some(dir) = plot_dir {
        let y = DMatrix::from_column_slice(u.len(), 1, u.as_slice());
        plots("x", &[name.to_string()], x, &y, dir)?;
    }
    Ok(())
}

/// Worked problems:
/// 0 - u_xx = 0, u(0) = 1, u(1) = 4 (exact for a linear solution);
/// 1 - u_xx = e^x, u(0) = 0, u(1) = 3, with a grid refinement study;
/// 2 - u_xx = e^x, u(-1) = 3, u_x(1) = -5 (ghost-point Neumann row);
/// 3 - pendulum u'' = -sin(u), u(0) = 0, u(2) = pi/2 by shooting.
pub fn bvp_examples(example: usize, config: &BVPConfig, plot_dir: Option<&Path>) -> Result<(), BVPError> {
    let fd_solver = FiniteDifferenceSolver::from_config(&config.finite_difference);
    match example {
        0 => {
            let (u_a, u_b) = (1.0, 4.0);
            let solution = fd_solver.solve_dirichlet(|_x: f64| 0.0, 0.0, 1.0, u_a, u_b)?;
            let err = solution.max_error(|x| u_a + (u_b - u_a) * x);
            info!("u_xx = 0: max deviation from the straight line {:e}", err);
            plot_fd(&solution.x, &solution.u, "u_linear", plot_dir)?;
        }
        1 => {
            let exact = |x: f64| x.exp() + (4.0 - E) * x - 1.0;
            let solution = fd_solver.solve_dirichlet(|x: f64| x.exp(), 0.0, 1.0, 0.0, 3.0)?;
            info!(
                "u_xx = e^x with N = {}: max error {:e}",
                fd_solver.n_interior,
                solution.max_error(exact)
            );
            let ns = [9, 19, 39, 79, 159];
            let study = convergence_study(&ns, exact, |n| {
                fd_solver
                    .with_n_interior(n)
                    .solve_dirichlet(|x: f64| x.exp(), 0.0, 1.0, 0.0, 3.0)
            })?;
            info!("\n{}", study.to_table());
            plot_fd(&solution.x, &solution.u, "u_dirichlet", plot_dir)?;
        }
        2 => {
            let exact = |x: f64| -(5.0 + E) * x - (2.0 + E + 1.0 / E) + x.exp();
            let solution = fd_solver.solve_mixed(
                |x: f64| x.exp(),
                -1.0,
                1.0,
                BoundaryCondition::dirichlet(3.0),
                BoundaryCondition::neumann(-5.0),
            )?;
            info!(
                "u_xx = e^x, u(-1) = 3, u_x(1) = -5 with N = {}: max error {:e}",
                fd_solver.n_interior,
                solution.max_error(exact)
            );
            plot_fd(&solution.x, &solution.u, "u_mixed", plot_dir)?;
        }
        3 => {
            let ode_system = |_x: f64, v: &DVector<f64>| -> DVector<f64> {
                DVector::from_vec(vec![v[1], -v[0].sin()])
            };
            let problem = BoundaryValueProblem::dirichlet(ode_system, 0.0, 2.0, 0.0, FRAC_PI_2);
            let mut solver = ShootingMethodSolver::from_config(&config.shooting);
            let result = solver.solve(&problem)?;
            info!(
                "pendulum: success = {}, iterations = {}, u_x(0) = {}, residual = {:e}",
                result.success,
                result.iterations,
                result.s,
                result.final_residual().unwrap_or(f64::NAN)
            );
            info!("\n{}", result.convergence_table());
            if let Some(dir) = plot_dir {
                plots(
                    "x",
                    &["u".to_string(), "u_x".to_string()],
                    &solver.get_x(),
                    &solver.get_y(),
                    dir,
                )?;
            }
        }
        _ => {
            return Err(BVPError::invalid(format!(
                "no example number {}, choose 0..=3",
                example
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_examples_run_without_plots() {
        let config = BVPConfig::default();
        for example in 0..4 {
            bvp_examples(example, &config, None).unwrap();
        }
        assert!(bvp_examples(4, &config, None).unwrap_err().is_invalid_input());
    }
}
