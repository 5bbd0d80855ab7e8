//! Finite-difference solvers for u_xx = f(x) on a uniform grid
pub mod FD_api;
pub mod FD_convergence;
pub mod FD_dirichlet;
pub mod FD_mixed;
pub mod grid_api;
