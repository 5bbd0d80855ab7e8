#[cfg(test)]
mod tests {
    use super::super::Shooting_simple::*;
    use crate::numerical::BVP_errors::BVPError;
    use crate::numerical::NonStiff_api::{IVPIntegrator, IVPSettings, RK4};
    use crate::Utils::config::ShootingConfig;
    use approx::assert_abs_diff_eq;
    use nalgebra::{DMatrix, DVector};
    use simplelog::*;
    use std::f64::consts::FRAC_PI_2;

    fn init_logger() {
        let _ = SimpleLogger::init(LevelFilter::Info, Config::default());
    }

    fn pendulum(_x: f64, v: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![v[1], -v[0].sin()])
    }

    fn exponential(_x: f64, v: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![v[1], v[0]])
    }

    fn straight_line(_x: f64, v: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![v[1], 0.0])
    }

    fn pendulum_solver() -> ShootingMethodSolver {
        ShootingMethodSolver {
            initial_guess: 1.0,
            initial_step: 0.5,
            tolerance: 1e-8,
            max_iterations: 100,
            n_points: 101,
            search: ShootingSearch::StepHalving,
            ivp_settings: IVPSettings {
                rtol: 1e-10,
                atol: 1e-12,
                ..IVPSettings::default()
            },
            result: ShootingMethodResult::default(),
        }
    }

    /// Delegates to RK4 and counts calls; fails on the `fail_on`-th call if set.
    struct CountingIntegrator {
        calls: usize,
        fail_on: Option<usize>,
        inner: RK4,
    }

    impl CountingIntegrator {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                calls: 0,
                fail_on,
                inner: RK4::new(1e-3),
            }
        }
    }

    impl IVPIntegrator for CountingIntegrator {
        fn integrate<F>(
            &mut self,
            f: &F,
            x0: f64,
            y0: DVector<f64>,
            x_eval: &[f64],
        ) -> Result<DMatrix<f64>, BVPError>
        where
            F: Fn(f64, &DVector<f64>) -> DVector<f64>,
        {
            self.calls += 1;
            if Some(self.calls) == self.fail_on {
                return Err(BVPError::IntegrationFailure {
                    x: 0.5,
                    reason: "injected failure".to_string(),
                });
            }
            self.inner.integrate(f, x0, y0, x_eval)
        }
    }

    #[test]
    fn nonlinear_pendulum_converges() {
        init_logger();
        let problem = BoundaryValueProblem::dirichlet(pendulum, 0.0, 2.0, 0.0, FRAC_PI_2);
        let mut solver = pendulum_solver();
        let result = solver.solve(&problem).unwrap();

        assert!(result.success);
        assert!(result.iterations <= 100);
        assert_eq!(result.residuals.len(), result.iterations);
        assert!(result.final_residual().unwrap() < 1e-8);
        assert!((result.bound_values[0] - FRAC_PI_2).abs() < 1e-8);
        // left boundary is the initial state itself
        assert_eq!(result.y[(0, 0)], 0.0);
        assert_eq!(result.y[(0, 1)], result.s);
        assert_eq!(result.x_mesh.len(), 101);
        assert_eq!(result.x_mesh[0], 0.0);
        assert_eq!(result.x_mesh[100], 2.0);
        println!("{}", result.convergence_table());
    }

    #[test]
    fn first_residual_uses_initial_guess() {
        init_logger();
        // u'' = u, u(0) = 0 gives u(1) = s sinh(1)
        let target = 2.0;
        let problem = BoundaryValueProblem::dirichlet(exponential, 0.0, 1.0, 0.0, target);
        let mut solver = pendulum_solver();
        let result = solver.solve(&problem).unwrap();
        assert!(result.success);
        assert_abs_diff_eq!(
            result.residuals[0],
            (1.0_f64.sinh() - target).abs(),
            epsilon = 1e-8
        );
        assert_abs_diff_eq!(result.s, target / 1.0_f64.sinh(), epsilon = 1e-7);
    }

    #[test]
    fn linear_ode_recovers_exact_slope() {
        init_logger();
        let problem = BoundaryValueProblem::dirichlet(exponential, 0.0, 1.0, 0.0, 1.0_f64.sinh());
        let mut solver = pendulum_solver();
        let result = solver.solve(&problem).unwrap();
        assert!(result.success);
        assert_abs_diff_eq!(result.s, 1.0, epsilon = 1e-7);
        let x = solver.get_x();
        let y = solver.get_y();
        assert_eq!(y.ncols(), 2);
        assert_eq!(y, result.y);
        for i in 0..x.len() {
            assert_abs_diff_eq!(y[(i, 0)], x[i].sinh(), epsilon = 1e-7);
            assert_abs_diff_eq!(y[(i, 1)], x[i].cosh(), epsilon = 1e-6);
        }
    }

    #[test]
    fn step_halving_sequence() {
        // below target: move up by the full step
        assert_eq!(step_halving_update(1.0, 0.5, 0.2, 1.0), (1.5, 0.5));
        // at or above target: move back and halve
        assert_eq!(step_halving_update(1.5, 0.5, 1.3, 1.0), (1.0, 0.25));
        assert_eq!(step_halving_update(1.0, 0.25, 1.0, 1.0), (0.75, 0.125));

        let state = SearchState::new(1.0, 0.5);
        let next = state.advance(ShootingSearch::StepHalving, 0.0, 1.0);
        assert_eq!(next.guess, 1.5);
        assert_eq!(next.step, 0.5);
        assert_eq!(next.previous, Some((1.0, -1.0)));
    }

    #[test]
    fn secant_update_on_linear_residual() {
        // q(s) = 2 s, target 3: exact after one secant update
        let state = SearchState::new(1.0, 0.5);
        let state = state.advance(ShootingSearch::Secant, 2.0, 3.0);
        assert_eq!(state.guess, 1.5);
        let state = state.advance(ShootingSearch::Secant, 3.0 * 1.0, 3.0);
        assert_eq!(state.guess, 1.5);
        let state = SearchState {
            guess: 2.0,
            step: 0.5,
            previous: Some((1.0, -1.0)),
        };
        let state = state.advance(ShootingSearch::Secant, 4.0, 3.0);
        assert_abs_diff_eq!(state.guess, 1.5, epsilon = 1e-15);
    }

    #[test]
    fn secant_search_needs_fewer_shots() {
        init_logger();
        let problem = BoundaryValueProblem::dirichlet(pendulum, 0.0, 2.0, 0.0, FRAC_PI_2);
        let mut halving = pendulum_solver();
        let halving_result = halving.solve(&problem).unwrap();
        let mut secant = pendulum_solver();
        secant.search = ShootingSearch::Secant;
        let secant_result = secant.solve(&problem).unwrap();
        assert!(secant_result.success);
        assert!(secant_result.iterations < halving_result.iterations);
        assert_abs_diff_eq!(secant_result.s, halving_result.s, epsilon = 1e-6);
    }

    #[test]
    fn non_convergence_is_reported_not_raised() {
        init_logger();
        let problem = BoundaryValueProblem::dirichlet(pendulum, 0.0, 2.0, 0.0, FRAC_PI_2);
        let mut solver = pendulum_solver();
        solver.max_iterations = 3;
        let result = solver.solve(&problem).unwrap();
        assert!(!result.success);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.residuals.len(), 3);
        assert!(result.final_residual().unwrap() > 1e-8);
        assert_eq!(solver.convergence_trace().len(), 3);
    }

    #[test]
    fn invalid_step_rejected_before_integration() {
        init_logger();
        let problem = BoundaryValueProblem::dirichlet(straight_line, 0.0, 1.0, 0.0, 1.0);
        for bad_step in [0.0, -0.5, f64::NAN] {
            let mut solver = pendulum_solver();
            solver.initial_step = bad_step;
            let mut integrator = CountingIntegrator::new(None);
            let err = solver.solve_with(&problem, &mut integrator).unwrap_err();
            assert!(err.is_invalid_input());
            assert_eq!(integrator.calls, 0);
            assert!(solver.convergence_trace().is_empty());
        }
    }

    #[test]
    fn invalid_problem_rejected() {
        init_logger();
        let mut integrator = CountingIntegrator::new(None);

        let mut solver = pendulum_solver();
        solver.n_points = 1;
        let problem = BoundaryValueProblem::dirichlet(straight_line, 0.0, 1.0, 0.0, 1.0);
        assert!(solver.solve_with(&problem, &mut integrator).unwrap_err().is_invalid_input());

        let mut solver = pendulum_solver();
        solver.tolerance = 0.0;
        assert!(solver.solve_with(&problem, &mut integrator).unwrap_err().is_invalid_input());

        let mut solver = pendulum_solver();
        solver.max_iterations = 0;
        assert!(solver.solve_with(&problem, &mut integrator).unwrap_err().is_invalid_input());

        let mut solver = pendulum_solver();
        let reversed = BoundaryValueProblem::dirichlet(straight_line, 1.0, 1.0, 0.0, 1.0);
        assert!(solver.solve_with(&reversed, &mut integrator).unwrap_err().is_invalid_input());

        let bad_value = BoundaryValueProblem::dirichlet(straight_line, 0.0, 1.0, 0.0, f64::INFINITY);
        assert!(solver.solve_with(&bad_value, &mut integrator).unwrap_err().is_invalid_input());
        assert_eq!(integrator.calls, 0);
    }

    #[test]
    fn integration_failure_aborts_and_keeps_trace() {
        init_logger();
        let problem = BoundaryValueProblem::dirichlet(pendulum, 0.0, 2.0, 0.0, FRAC_PI_2);
        let mut solver = pendulum_solver();
        let mut integrator = CountingIntegrator::new(Some(3));
        let err = solver.solve_with(&problem, &mut integrator).unwrap_err();
        assert!(err.is_integration_failure());
        assert_eq!(integrator.calls, 3);
        let partial = solver.get_solution();
        assert!(!partial.success);
        assert_eq!(partial.iterations, 2);
        assert_eq!(solver.convergence_trace().len(), 2);
    }

    #[test]
    fn blow_up_in_ivp_is_fatal() {
        init_logger();
        // u'' = u^2 escapes to infinity before x = 10 for a large enough slope
        let ode = |_x: f64, v: &DVector<f64>| -> DVector<f64> { DVector::from_vec(vec![v[1], v[0] * v[0]]) };
        let problem = BoundaryValueProblem::dirichlet(ode, 0.0, 10.0, 1.0, 2.0);
        let mut solver = pendulum_solver();
        solver.initial_guess = 5.0;
        let err = solver.solve(&problem).unwrap_err();
        assert!(err.is_integration_failure());
    }

    #[test]
    fn repeated_solves_are_identical() {
        init_logger();
        let problem = BoundaryValueProblem::dirichlet(pendulum, 0.0, 2.0, 0.0, FRAC_PI_2);
        let mut solver = pendulum_solver();
        let first = solver.solve(&problem).unwrap();
        let second = solver.solve(&problem).unwrap();
        assert_eq!(first.y, second.y);
        assert_eq!(first.residuals, second.residuals);
        assert_eq!(first.s, second.s);
    }

    #[test]
    fn custom_integrator_linear_problem() {
        init_logger();
        // u'' = 0, u(0) = 2, u(1) = 5: u = 3x + 2
        let problem = BoundaryValueProblem::dirichlet(straight_line, 0.0, 1.0, 2.0, 5.0);
        let mut solver = pendulum_solver();
        solver.n_points = 11;
        let mut integrator = CountingIntegrator::new(None);
        let result = solver.solve_with(&problem, &mut integrator).unwrap();
        assert!(result.success);
        assert_abs_diff_eq!(result.s, 3.0, epsilon = 1e-9);
        assert_eq!(integrator.calls, result.iterations);
        let u = result.u();
        for (i, x) in result.x_mesh.iter().enumerate() {
            assert_abs_diff_eq!(u[i], 3.0 * x + 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn dirichlet_neumann() {
        init_logger();
        // u'' = u, u(0) = 0, u'(1) = cosh(1): u = sinh(x)
        let problem = BoundaryValueProblem::new(
            exponential,
            0.0,
            1.0,
            BoundaryCondition::dirichlet(0.0),
            BoundaryCondition::neumann(1.0_f64.cosh()),
        );
        let mut solver = pendulum_solver();
        let result = solver.solve(&problem).unwrap();
        assert!(result.success);
        assert_abs_diff_eq!(result.bound_values[1], 1.0_f64.cosh(), epsilon = 1e-8);
        assert_abs_diff_eq!(result.s, 1.0, epsilon = 1e-7);
        let u = result.u();
        for (i, x) in result.x_mesh.iter().enumerate() {
            assert_abs_diff_eq!(u[i], x.sinh(), epsilon = 1e-7);
        }
    }

    #[test]
    fn neumann_dirichlet() {
        init_logger();
        // u'' = u, u'(0) = 1, u(1) = sinh(1): unknown u(0) = 0
        let problem = BoundaryValueProblem::new(
            exponential,
            0.0,
            1.0,
            BoundaryCondition::neumann(1.0),
            BoundaryCondition::dirichlet(1.0_f64.sinh()),
        );
        let mut solver = pendulum_solver();
        solver.initial_guess = 0.5;
        let result = solver.solve(&problem).unwrap();
        assert!(result.success);
        assert_abs_diff_eq!(result.s, 0.0, epsilon = 1e-7);
        assert_eq!(result.y[(0, 1)], 1.0);
        let u = result.u();
        for (i, x) in result.x_mesh.iter().enumerate() {
            assert_abs_diff_eq!(u[i], x.sinh(), epsilon = 1e-7);
        }
    }

    #[test]
    fn solver_from_config() {
        let config = ShootingConfig {
            n_points: 21,
            search: ShootingSearch::Secant,
            ..ShootingConfig::default()
        };
        let solver = ShootingMethodSolver::from_config(&config);
        assert_eq!(solver.n_points, 21);
        assert_eq!(solver.search, ShootingSearch::Secant);
        assert_eq!(solver.initial_guess, 1.0);
        assert_eq!(solver.initial_step, 0.5);
        assert_eq!(solver.tolerance, 1e-8);
        assert_eq!(solver.max_iterations, 100);
        assert_eq!("secant".parse::<ShootingSearch>().unwrap(), ShootingSearch::Secant);
        assert_eq!(ShootingSearch::StepHalving.to_string(), "step_halving");
    }

    #[test]
    fn report_table_and_csv() {
        init_logger();
        let problem = BoundaryValueProblem::dirichlet(straight_line, 0.0, 1.0, 2.0, 5.0);
        let mut solver = pendulum_solver();
        solver.n_points = 5;
        let result = solver.solve(&problem).unwrap();
        let table = result.to_table();
        assert!(table.contains("u_x"));
        assert!(table.contains("0.25"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shooting.csv");
        solver.save_to_csv(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "x,u,u_x");
        assert!(lines[1].starts_with("0,2,"));
    }
}
