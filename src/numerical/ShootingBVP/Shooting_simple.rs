//! # Shooting Method for Boundary Value Problems (BVP)
//!
//! This module implements the shooting method to solve second-order boundary value problems
//! of the form: u'' = F(x, u, u') written as the first-order system v' = F(x, v), v = (u, u').
//!
//! ## Supported Boundary Conditions
//! 1. **Dirichlet-Dirichlet**: u(a) = α, u(b) = β
//! 2. **Dirichlet-Neumann**: u(a) = α, u'(b) = γ
//! 3. **Neumann-Dirichlet**: u'(a) = α, u(b) = β
//! 4. **Neumann-Neumann**: u'(a) = α, u'(b) = γ
//!
//! ## Method Overview
//! The shooting method converts a BVP into a sequence of initial value problems (IVP):
//! 1. Guess the unknown initial condition s (u'(a) for a Dirichlet left end, u(a) for a Neumann one)
//! 2. Integrate the IVP from a to b, sampling the state on `n_points` equally spaced abscissae
//! 3. Compare the computed right-end quantity with its target; stop once the residual
//!    |q(b) - target| drops below `tolerance`, otherwise adjust s and repeat
//!
//! ## Search strategies
//! - [`ShootingSearch::StepHalving`]: if q(b) < target then s += Δs, otherwise s -= Δs and Δs /= 2.
//!   The step is halved only when the search overshoots, so this is a heuristic and
//!   not a bracketing bisection; it converges when q(b) grows monotonically with s.
//! - [`ShootingSearch::Secant`]: s ← s - r (s - s_prev)/(r - r_prev), seeded with s0 + Δs.
//!
//! Non-convergence within `max_iterations` is not an error: the result comes back with
//! `success == false` and the full residual trace. An integrator failure aborts the solve.
//!
//! ## Usage Example
//! ```rust, ignore
//! use nalgebra::DVector;
//! use RustedBVP::numerical::ShootingBVP::Shooting_simple::*;
//! // u'' = -sin(u), u(0) = 0, u(2) = π/2
//! let ode_system = |_x: f64, v: &DVector<f64>| -> DVector<f64> {
//!     DVector::from_vec(vec![v[1], -v[0].sin()])
//! };
//! let problem = BoundaryValueProblem::dirichlet(ode_system, 0.0, 2.0, 0.0, std::f64::consts::FRAC_PI_2);
//! let mut solver = ShootingMethodSolver::new();
//! let result = solver.solve(&problem).unwrap();
//! assert!(result.success);
//! ```
pub use crate::numerical::boundary_conditions::{BoundaryCondition, BoundaryConditionType};
use crate::numerical::BVP_errors::BVPError;
use crate::numerical::NonStiff_api::{DormandPrince, IVPIntegrator, IVPSettings, linspace};
use crate::Utils::config::ShootingConfig;
use crate::Utils::logger::save_matrix_to_csv;
use crate::Utils::tables::{convergence_table, solution_table};
use log::{debug, error, info, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum_macros::{Display, EnumString};

/// Represents the BVP problem: u'' = F(x, u, u') with boundary conditions at a and b.
pub struct BoundaryValueProblem<F> {
    /// The ODE system in 1st-order form: dv/dx = F(x, v), v = (u, u')
    pub ode_system: F,
    pub a: f64,
    pub b: f64,
    pub left_bc: BoundaryCondition,
    pub right_bc: BoundaryCondition,
}

impl<F> BoundaryValueProblem<F>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    pub fn new(
        ode_system: F,
        a: f64,
        b: f64,
        left_bc: BoundaryCondition,
        right_bc: BoundaryCondition,
    ) -> Self {
        Self {
            ode_system,
            a,
            b,
            left_bc,
            right_bc,
        }
    }

    /// u(a) = u_a, u(b) = u_b
    pub fn dirichlet(ode_system: F, a: f64, b: f64, u_a: f64, u_b: f64) -> Self {
        Self::new(
            ode_system,
            a,
            b,
            BoundaryCondition::dirichlet(u_a),
            BoundaryCondition::dirichlet(u_b),
        )
    }

    fn validate(&self) -> Result<(), BVPError> {
        if !self.a.is_finite() || !self.b.is_finite() || !(self.a < self.b) {
            return Err(BVPError::invalid(format!(
                "boundary locations must be finite with a < b, got a = {}, b = {}",
                self.a, self.b
            )));
        }
        self.left_bc.validate("left")?;
        self.right_bc.validate("right")?;
        Ok(())
    }

    /// Initial state (u(a), u'(a)) for the unknown initial condition `guess`.
    pub fn initial_state(&self, guess: f64) -> DVector<f64> {
        match self.left_bc.bc_type {
            // u(a) = known, u'(a) = guess
            BoundaryConditionType::Dirichlet => DVector::from_vec(vec![self.left_bc.value, guess]),
            // u'(a) = known, u(a) = guess
            BoundaryConditionType::Neumann => DVector::from_vec(vec![guess, self.left_bc.value]),
        }
    }

    /// Index of the state component compared with the right boundary value.
    fn target_component(&self) -> usize {
        match self.right_bc.bc_type {
            BoundaryConditionType::Dirichlet => 0,
            BoundaryConditionType::Neumann => 1,
        }
    }
}

/// Rule used to update the unknown initial condition between shots.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShootingSearch {
    #[default]
    StepHalving,
    Secant,
}

/// Step-halving update: returns the next (guess, step).
pub fn step_halving_update(guess: f64, step: f64, computed: f64, target: f64) -> (f64, f64) {
    if computed < target {
        (guess + step, step)
    } else {
        (guess - step, step / 2.0)
    }
}

/// Search state threaded through the shooting iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchState {
    pub guess: f64,
    pub step: f64,
    /// previous (guess, signed residual), used by the secant rule
    pub previous: Option<(f64, f64)>,
}

impl SearchState {
    pub fn new(guess: f64, step: f64) -> Self {
        Self {
            guess,
            step,
            previous: None,
        }
    }

    pub fn advance(self, search: ShootingSearch, computed: f64, target: f64) -> Self {
        let signed_residual = computed - target;
        match search {
            ShootingSearch::StepHalving => {
                let (guess, step) = step_halving_update(self.guess, self.step, computed, target);
                Self {
                    guess,
                    step,
                    previous: Some((self.guess, signed_residual)),
                }
            }
            ShootingSearch::Secant => {
                let guess = match self.previous {
                    None => self.guess + self.step,
                    Some((s_prev, r_prev)) if signed_residual != r_prev => {
                        self.guess - signed_residual * (self.guess - s_prev) / (signed_residual - r_prev)
                    }
                    // flat secant, take a step-halving move instead
                    Some(_) => step_halving_update(self.guess, self.step, computed, target).0,
                };
                Self {
                    guess,
                    step: self.step,
                    previous: Some((self.guess, signed_residual)),
                }
            }
        }
    }
}

/// Configuration for the shooting method solver.
pub struct ShootingMethodSolver {
    /// initial guess s0 for the unknown initial condition
    pub initial_guess: f64,
    /// initial perturbation Δs of the guess
    pub initial_step: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
    /// number of output abscissae, both ends included
    pub n_points: usize,
    pub search: ShootingSearch,
    pub ivp_settings: IVPSettings,
    pub result: ShootingMethodResult,
}

#[derive(Debug, Clone)]
pub struct ShootingMethodResult {
    pub x_mesh: DVector<f64>,
    /// one row per mesh point: (u, u')
    pub y: DMatrix<f64>,
    /// unknown initial condition used for the returned table
    pub s: f64,
    pub success: bool,
    pub iterations: usize,
    /// |q(b) - target| of every shot, in order
    pub residuals: Vec<f64>,
    /// state (u(b), u'(b)) at the right end
    pub bound_values: DVector<f64>,
}

impl Default for ShootingMethodResult {
    fn default() -> Self {
        Self {
            x_mesh: DVector::zeros(0),
            y: DMatrix::zeros(0, 0),
            s: 0.0,
            success: false,
            iterations: 0,
            residuals: Vec::new(),
            bound_values: DVector::zeros(0),
        }
    }
}

impl ShootingMethodResult {
    pub fn u(&self) -> DVector<f64> {
        self.y.column(0).into_owned()
    }

    pub fn u_x(&self) -> DVector<f64> {
        self.y.column(1).into_owned()
    }

    pub fn final_residual(&self) -> Option<f64> {
        self.residuals.last().copied()
    }

    pub fn to_table(&self) -> String {
        solution_table(
            "x",
            &["u".to_string(), "u_x".to_string()],
            &self.x_mesh,
            &self.y,
        )
    }

    pub fn convergence_table(&self) -> String {
        convergence_table(&self.residuals)
    }
}

impl Default for ShootingMethodSolver {
    fn default() -> Self {
        Self::from_config(&ShootingConfig::default())
    }
}

impl ShootingMethodSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ShootingConfig) -> Self {
        Self {
            initial_guess: config.initial_guess,
            initial_step: config.initial_step,
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
            n_points: config.n_points,
            search: config.search,
            ivp_settings: config.ivp,
            result: ShootingMethodResult::default(),
        }
    }

    fn validate(&self) -> Result<(), BVPError> {
        if !(self.initial_step > 0.0) || !self.initial_step.is_finite() {
            return Err(BVPError::invalid(format!(
                "initial step must be positive, got {}",
                self.initial_step
            )));
        }
        if !self.initial_guess.is_finite() {
            return Err(BVPError::invalid("initial guess must be finite"));
        }
        if !(self.tolerance > 0.0) {
            return Err(BVPError::invalid(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(BVPError::invalid("max_iterations must be positive"));
        }
        if self.n_points < 2 {
            return Err(BVPError::invalid(format!(
                "at least 2 output points are required, got {}",
                self.n_points
            )));
        }
        self.ivp_settings.validate()
    }

    /// Solves the BVP with the adaptive Dormand-Prince integrator.
    pub fn solve<F>(
        &mut self,
        problem: &BoundaryValueProblem<F>,
    ) -> Result<ShootingMethodResult, BVPError>
    where
        F: Fn(f64, &DVector<f64>) -> DVector<f64>,
    {
        let mut integrator = DormandPrince::new(self.ivp_settings);
        self.solve_with(problem, &mut integrator)
    }

    /// Solves the BVP with a caller-supplied IVP integrator.
    pub fn solve_with<F, I>(
        &mut self,
        problem: &BoundaryValueProblem<F>,
        integrator: &mut I,
    ) -> Result<ShootingMethodResult, BVPError>
    where
        F: Fn(f64, &DVector<f64>) -> DVector<f64>,
        I: IVPIntegrator,
    {
        self.result = ShootingMethodResult::default();
        self.validate()?;
        problem.validate()?;
        info!("Starting shooting method solver");
        debug!(
            "Problem parameters: a={}, b={}, left_bc={:?}, right_bc={:?}",
            problem.a, problem.b, problem.left_bc, problem.right_bc
        );
        debug!(
            "Solver parameters: initial_guess={}, initial_step={}, tolerance={}, max_iterations={}, n_points={}, search={}",
            self.initial_guess,
            self.initial_step,
            self.tolerance,
            self.max_iterations,
            self.n_points,
            self.search
        );

        let x_eval = linspace(problem.a, problem.b, self.n_points);
        self.result.x_mesh = DVector::from_column_slice(&x_eval);
        let component = problem.target_component();
        let target = problem.right_bc.value;
        let last = self.n_points - 1;
        let mut state = SearchState::new(self.initial_guess, self.initial_step);

        for iteration in 0..self.max_iterations {
            let y0 = problem.initial_state(state.guess);
            let solution = match integrator.integrate(&problem.ode_system, problem.a, y0, &x_eval) {
                Ok(solution) => solution,
                Err(e) => {
                    error!(
                        "IVP integration failed on iteration {} with guess s = {}: {}",
                        iteration, state.guess, e
                    );
                    self.result.iterations = iteration;
                    return Err(e);
                }
            };
            let computed = solution[(last, component)];
            let residual = (computed - target).abs();
            self.result.residuals.push(residual);
            self.result.iterations = iteration + 1;
            self.result.s = state.guess;
            self.result.bound_values = solution.row(last).transpose();
            self.result.y = solution;
            debug!(
                "Iteration {}: s={}, q(b)={}, residual={}",
                iteration, state.guess, computed, residual
            );

            if !residual.is_finite() {
                error!("residual is not finite at s = {}", state.guess);
                return Err(BVPError::IntegrationFailure {
                    x: problem.b,
                    reason: format!("non-finite boundary value for s = {}", state.guess),
                });
            }
            if residual < self.tolerance {
                self.result.success = true;
                info!(
                    "Shooting method converged after {} iterations: s = {}, residual = {:e}",
                    iteration + 1,
                    state.guess,
                    residual
                );
                return Ok(self.result.clone());
            }
            state = state.advance(self.search, computed, target);
        }

        warn!(
            "Shooting method did not converge after {} iterations, last residual = {:e}",
            self.max_iterations,
            self.result.final_residual().unwrap_or(f64::NAN)
        );
        Ok(self.result.clone())
    }

    pub fn get_solution(&self) -> ShootingMethodResult {
        self.result.clone()
    }

    pub fn get_y(&self) -> DMatrix<f64> {
        self.result.y.clone()
    }

    pub fn get_x(&self) -> DVector<f64> {
        self.result.x_mesh.clone()
    }

    pub fn convergence_trace(&self) -> &[f64] {
        &self.result.residuals
    }

    pub fn save_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), BVPError> {
        save_matrix_to_csv(
            &self.result.y,
            &["u".to_string(), "u_x".to_string()],
            path,
            &self.result.x_mesh,
            "x",
        )
    }
}
