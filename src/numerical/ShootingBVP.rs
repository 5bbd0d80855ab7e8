//! Shooting method for two-point boundary value problems of second-order ODEs
pub mod Shooting_simple;
mod Shooting_tests;
