//! different utility modules used throughout the project
/// solver settings from TOML files
pub mod config;
/// logger setup and saving of solutions into files
pub mod logger;
/// tiny module to plot solutions
pub mod plots;
/// pretty-printed tables
pub mod tables;
