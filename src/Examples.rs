//! examples of usage of RustedBVP
/// BVP examples: finite differences and shooting
pub mod bvp_examples;
