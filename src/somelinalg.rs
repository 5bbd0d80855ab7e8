//! some linear algebra functions used throughout the code
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// square banded matrix storage
pub mod band_matrix;
/// Thomas algorithm for tridiagonal systems
pub mod thomas;
/// banded LU decomposition with partial pivoting
pub mod RustedLINPACK;
/// dispatch between Thomas, banded LU and dense LU
pub mod linear_solver_api;
/// diagnostics for linear systems and matrices: if it is singular
/// or poorly conditioned
pub mod linear_sys_diagnostics;
