//! # Non-stiff IVP integrators
//!
//! Explicit Runge-Kutta integrators for first-order systems `dy/dx = f(x, y)`.
//! Both integrators implement [`IVPIntegrator`]: given an initial state and an
//! ordered list of output abscissae, they return one state snapshot per
//! abscissa (row `i` of the returned matrix is the state at `x_eval[i]`).
//!
//! - [`DormandPrince`] - embedded 5(4) pair with adaptive step-size control;
//!   every requested abscissa is hit exactly by clamping the last step.
//! - [`RK4`] - classical fixed-step 4th order method, each output interval is
//!   split into `ceil(dx/h)` equal steps.
use crate::numerical::BVP_errors::BVPError;
use log::{debug, error, info};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Tolerances and limits of the adaptive integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IVPSettings {
    pub rtol: f64,
    pub atol: f64,
    pub max_step: f64,
    pub first_step: Option<f64>,
    pub max_steps: usize,
}

impl Default for IVPSettings {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-10,
            max_step: f64::INFINITY,
            first_step: None,
            max_steps: 100_000,
        }
    }
}

impl IVPSettings {
    pub fn validate(&self) -> Result<(), BVPError> {
        if !(self.rtol > 0.0) || !(self.atol > 0.0) {
            return Err(BVPError::invalid(format!(
                "tolerances must be positive, got rtol = {}, atol = {}",
                self.rtol, self.atol
            )));
        }
        if !(self.max_step > 0.0) {
            return Err(BVPError::invalid("`max_step` must be positive."));
        }
        if let Some(h) = self.first_step {
            if !(h > 0.0) || !h.is_finite() {
                return Err(BVPError::invalid("`first_step` must be positive."));
            }
        }
        if self.max_steps == 0 {
            return Err(BVPError::invalid("`max_steps` must be positive."));
        }
        Ok(())
    }
}

/// Capability of advancing `dy/dx = f(x, y)` from `x0` through every abscissa of `x_eval`.
pub trait IVPIntegrator {
    fn integrate<F>(
        &mut self,
        f: &F,
        x0: f64,
        y0: DVector<f64>,
        x_eval: &[f64],
    ) -> Result<DMatrix<f64>, BVPError>
    where
        F: Fn(f64, &DVector<f64>) -> DVector<f64>;
}

fn validate_output_points(x0: f64, x_eval: &[f64]) -> Result<(), BVPError> {
    if x_eval.is_empty() {
        return Err(BVPError::invalid("no output points requested"));
    }
    if x_eval.iter().any(|x| !x.is_finite()) {
        return Err(BVPError::invalid("output points must be finite"));
    }
    if x_eval[0] < x0 {
        return Err(BVPError::invalid(format!(
            "first output point {} lies before the initial point {}",
            x_eval[0], x0
        )));
    }
    if x_eval.windows(2).any(|w| w[1] < w[0]) {
        return Err(BVPError::invalid("output points must be non-decreasing"));
    }
    Ok(())
}

fn rms_norm(v: &DVector<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.norm() / (v.len() as f64).sqrt()
}

/// Initial step heuristic (Hairer, Norsett & Wanner; same as SciPy's `select_initial_step`).
pub fn select_initial_step<F>(
    f: &F,
    x0: f64,
    y0: &DVector<f64>,
    f0: &DVector<f64>,
    x_bound: f64,
    order: f64,
    settings: &IVPSettings,
) -> f64
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    let interval_length = (x_bound - x0).abs();
    if interval_length == 0.0 || y0.is_empty() {
        return interval_length;
    }
    let scale = y0.map(|y_i| settings.atol + y_i.abs() * settings.rtol);
    let d0 = rms_norm(&y0.component_div(&scale));
    let d1 = rms_norm(&f0.component_div(&scale));
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    let h0 = h0.min(interval_length);
    let y1 = y0 + h0 * f0;
    let f1 = f(x0 + h0, &y1);
    let d2 = rms_norm(&(f1 - f0).component_div(&scale)) / h0;
    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (1e-6f64).max(h0 * 1e-3)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (order + 1.0))
    };
    (100.0 * h0)
        .min(h1)
        .min(interval_length)
        .min(settings.max_step)
}

// Dormand-Prince 5(4) tableau
const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A: [[f64; 6]; 7] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];
// difference between the 5th and the embedded 4th order weights
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Step statistics of the adaptive integrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub accepted: usize,
    pub rejected: usize,
    pub evaluations: usize,
}

/// Dormand-Prince 5(4) integrator with adaptive step size.
#[derive(Debug, Clone, Default)]
pub struct DormandPrince {
    pub settings: IVPSettings,
    pub stats: StepStats,
}

impl DormandPrince {
    pub fn new(settings: IVPSettings) -> Self {
        Self {
            settings,
            stats: StepStats::default(),
        }
    }

    pub fn stepper<'a, F>(&self, f: &'a F, x0: f64, y0: DVector<f64>) -> DopriStepper<'a, F>
    where
        F: Fn(f64, &DVector<f64>) -> DVector<f64>,
    {
        DopriStepper {
            f,
            x: x0,
            y: y0,
            h: self.settings.first_step,
            settings: self.settings,
            stats: StepStats::default(),
        }
    }
}

impl IVPIntegrator for DormandPrince {
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
        self.settings.validate()?;
        validate_output_points(x0, x_eval)?;
        let n = y0.len();
        let mut solution = DMatrix::zeros(x_eval.len(), n);
        let mut stepper = self.stepper(f, x0, y0);
        let result = x_eval.iter().enumerate().try_for_each(|(i, &x_out)| {
            stepper.step_to(x_out)?;
            solution.set_row(i, &stepper.y.transpose());
            Ok::<(), BVPError>(())
        });
        self.stats = stepper.stats;
        result?;
        debug!(
            "DOPRI5 finished: {} accepted, {} rejected steps, {} RHS evaluations",
            self.stats.accepted, self.stats.rejected, self.stats.evaluations
        );
        Ok(solution)
    }
}

/// Integration state of a single Dormand-Prince run.
pub struct DopriStepper<'a, F> {
    f: &'a F,
    pub x: f64,
    pub y: DVector<f64>,
    h: Option<f64>,
    settings: IVPSettings,
    pub stats: StepStats,
}

impl<'a, F> DopriStepper<'a, F>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    fn eval(&mut self, x: f64, y: &DVector<f64>) -> DVector<f64> {
        self.stats.evaluations += 1;
        (self.f)(x, y)
    }

    fn fail(&self, reason: impl Into<String>) -> BVPError {
        let reason = reason.into();
        error!("DOPRI5 failed at x = {}: {}", self.x, reason);
        BVPError::IntegrationFailure { x: self.x, reason }
    }

    /// Advances the state so that `self.x == x_target` exactly.
    pub fn step_to(&mut self, x_target: f64) -> Result<(), BVPError> {
        if x_target < self.x {
            return Err(BVPError::invalid(format!(
                "cannot step backwards from {} to {}",
                self.x, x_target
            )));
        }
        if x_target == self.x {
            return Ok(());
        }
        if self.y.iter().any(|v| !v.is_finite()) {
            return Err(self.fail("state is not finite"));
        }
        let mut k1 = self.eval(self.x, &self.y.clone());
        let mut h = match self.h {
            Some(h) => h,
            None => {
                let y = self.y.clone();
                let h0 = select_initial_step(self.f, self.x, &y, &k1, x_target, 4.0, &self.settings);
                self.stats.evaluations += 1;
                h0
            }
        };

        while self.x < x_target {
            if self.stats.accepted + self.stats.rejected >= self.settings.max_steps {
                return Err(self.fail(format!(
                    "maximum number of steps ({}) exceeded",
                    self.settings.max_steps
                )));
            }
            let h_min = 10.0 * f64::EPSILON * self.x.abs().max(x_target.abs()).max(1.0);
            h = h.min(self.settings.max_step);
            let remaining = x_target - self.x;
            let last = h >= remaining;
            let h_used = if last { remaining } else { h };
            if h_used < h_min && !last {
                return Err(self.fail(format!("step size {:e} too small", h_used)));
            }

            let mut k: Vec<DVector<f64>> = Vec::with_capacity(7);
            k.push(k1.clone());
            for i in 1..6 {
                let mut y_stage = self.y.clone();
                for (j, k_j) in k.iter().enumerate().take(i) {
                    if A[i][j] != 0.0 {
                        y_stage.axpy(h_used * A[i][j], k_j, 1.0);
                    }
                }
                let k_i = self.eval(self.x + C[i] * h_used, &y_stage);
                k.push(k_i);
            }
            // stage 7 is evaluated at the 5th order solution
            let mut y_new = self.y.clone();
            for (j, k_j) in k.iter().enumerate().take(6) {
                if A[6][j] != 0.0 {
                    y_new.axpy(h_used * A[6][j], k_j, 1.0);
                }
            }
            let k7 = self.eval(self.x + h_used, &y_new);
            k.push(k7);

            let mut err = DVector::zeros(self.y.len());
            for (e_i, k_i) in E.iter().zip(k.iter()) {
                if *e_i != 0.0 {
                    err.axpy(h_used * e_i, k_i, 1.0);
                }
            }
            let (atol, rtol) = (self.settings.atol, self.settings.rtol);
            let scale = self
                .y
                .zip_map(&y_new, |a, b| atol + rtol * a.abs().max(b.abs()));
            let err_norm = rms_norm(&err.component_div(&scale));

            if !err_norm.is_finite() || y_new.iter().any(|v| !v.is_finite()) {
                self.stats.rejected += 1;
                h = h_used * MIN_FACTOR;
                if h < h_min {
                    return Err(self.fail("solution became non-finite"));
                }
                continue;
            }

            if err_norm <= 1.0 {
                self.stats.accepted += 1;
                let factor = if err_norm == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err_norm.powf(ERROR_EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR)
                };
                self.x = if last { x_target } else { self.x + h_used };
                self.y = y_new;
                // a step shortened to land on the target does not shrink the natural step
                h = if last { h.max(h_used * factor) } else { h_used * factor };
                k1 = k.swap_remove(6);
            } else {
                self.stats.rejected += 1;
                h = h_used * (SAFETY * err_norm.powf(ERROR_EXPONENT)).max(MIN_FACTOR);
                if h < h_min {
                    return Err(self.fail(format!("step size {:e} too small", h)));
                }
            }
        }
        self.h = Some(h);
        Ok(())
    }
}

/// Classical 4th order Runge-Kutta with a fixed step size.
#[derive(Debug, Clone, Copy)]
pub struct RK4 {
    pub step_size: f64,
}

impl RK4 {
    pub fn new(step_size: f64) -> Self {
        Self { step_size }
    }
}

impl IVPIntegrator for RK4 {
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
        if !(self.step_size > 0.0) || !self.step_size.is_finite() {
            return Err(BVPError::invalid("RK4 step size must be positive"));
        }
        validate_output_points(x0, x_eval)?;
        let mut solution = DMatrix::zeros(x_eval.len(), y0.len());
        let mut x = x0;
        let mut y = y0;
        for (i, &x_out) in x_eval.iter().enumerate() {
            let n_steps = ((x_out - x) / self.step_size).ceil() as usize;
            if n_steps > 0 {
                let h = (x_out - x) / n_steps as f64;
                for _ in 0..n_steps {
                    let k1 = f(x, &y);
                    let k2 = f(x + h / 2.0, &(&y + (h / 2.0) * &k1));
                    let k3 = f(x + h / 2.0, &(&y + (h / 2.0) * &k2));
                    let k4 = f(x + h, &(&y + h * &k3));
                    y += (h / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
                    x += h;
                }
                x = x_out;
            }
            if y.iter().any(|v| !v.is_finite()) {
                return Err(BVPError::IntegrationFailure {
                    x,
                    reason: "solution became non-finite".to_string(),
                });
            }
            solution.set_row(i, &y.transpose());
        }
        Ok(solution)
    }
}

/// Integrates with default Dormand-Prince settings and returns `(x_eval, solution)`.
pub fn solve_ivp_at<F>(
    f: &F,
    x0: f64,
    y0: DVector<f64>,
    x_eval: &[f64],
    settings: IVPSettings,
) -> Result<(DVector<f64>, DMatrix<f64>), BVPError>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    let mut integrator = DormandPrince::new(settings);
    let solution = integrator.integrate(f, x0, y0, x_eval)?;
    info!(
        "IVP solved on [{}, {}] with {} output points",
        x0,
        x_eval[x_eval.len() - 1],
        x_eval.len()
    );
    Ok((DVector::from_column_slice(x_eval), solution))
}

/// `n` equally spaced points on `[a, b]` including both ends.
pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![a],
        _ => {
            let h = (b - a) / (n - 1) as f64;
            let mut x: Vec<f64> = (0..n).map(|i| a + i as f64 * h).collect();
            x[n - 1] = b;
            x
        }
    }
}
