/// error type shared by all solvers
pub mod BVP_errors;
/// Dirichlet and Neumann boundary conditions
pub mod boundary_conditions;
/// explicit Runge-Kutta IVP integrators used by the shooting method
/// Example
/// ```
/// use RustedBVP::numerical::NonStiff_api::{linspace, solve_ivp_at, IVPSettings};
/// use nalgebra::DVector;
/// // y' = -y, y(0) = 1
/// let f = |_x: f64, y: &DVector<f64>| -> DVector<f64> { -y.clone() };
/// let x_eval = linspace(0.0, 1.0, 11);
/// let (x, y) = solve_ivp_at(&f, 0.0, DVector::from_vec(vec![1.0]), &x_eval, IVPSettings::default()).unwrap();
/// assert!((y[(10, 0)] - (-1.0f64).exp()).abs() < 1e-7);
/// assert_eq!(x.len(), 11);
/// ```
pub mod NonStiff_api;
/// shooting method for second order BVPs
/// Example
/// ```
/// use RustedBVP::numerical::ShootingBVP::Shooting_simple::{BoundaryValueProblem, ShootingMethodSolver};
/// use nalgebra::DVector;
/// // u'' = -sin(u), u(0) = 0, u(2) = pi/2
/// let ode = |_x: f64, v: &DVector<f64>| -> DVector<f64> { DVector::from_vec(vec![v[1], -v[0].sin()]) };
/// let problem = BoundaryValueProblem::dirichlet(ode, 0.0, 2.0, 0.0, std::f64::consts::FRAC_PI_2);
/// let mut solver = ShootingMethodSolver::new();
/// let result = solver.solve(&problem).unwrap();
/// assert!(result.success);
/// ```
pub mod ShootingBVP;
/// finite-difference solvers for u_xx = f(x)
pub mod FD_BVP;
