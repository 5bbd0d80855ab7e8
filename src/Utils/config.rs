//! Solver configuration read from TOML.
//!
//! Every section and every field is optional, missing ones fall back to defaults:
//! ```toml
//! [shooting]
//! initial_guess = 1.0
//! initial_step = 0.5
//! search = "secant"
//!
//! [shooting.ivp]
//! rtol = 1e-10
//!
//! [finite_difference]
//! n_interior = 200
//! linear_solver = "band_lu"
//!
//! [logging]
//! level = "debug"
//! file = "bvp.log"
//! ```
use crate::numerical::BVP_errors::BVPError;
use crate::numerical::NonStiff_api::IVPSettings;
use crate::numerical::ShootingBVP::Shooting_simple::ShootingSearch;
use crate::somelinalg::linear_solver_api::LinearSolverKind;
use crate::Utils::logger::{init_file_logger, init_logger};
use log::info;
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BVPConfig {
    pub shooting: ShootingConfig,
    pub finite_difference: FiniteDifferenceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootingConfig {
    pub initial_guess: f64,
    pub initial_step: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub n_points: usize,
    pub search: ShootingSearch,
    pub ivp: IVPSettings,
}

impl Default for ShootingConfig {
    fn default() -> Self {
        Self {
            initial_guess: 1.0,
            initial_step: 0.5,
            tolerance: 1e-8,
            max_iterations: 100,
            n_points: 101,
            search: ShootingSearch::StepHalving,
            ivp: IVPSettings {
                rtol: 1e-10,
                atol: 1e-12,
                ..IVPSettings::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiniteDifferenceConfig {
    /// number of interior grid points N
    pub n_interior: usize,
    pub linear_solver: LinearSolverKind,
    /// log rank and condition number of the assembled system
    pub diagnostics: bool,
}

impl Default for FiniteDifferenceConfig {
    fn default() -> Self {
        Self {
            n_interior: 100,
            linear_solver: LinearSolverKind::Thomas,
            diagnostics: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, BVPError> {
        LevelFilter::from_str(&self.level)
            .map_err(|_| BVPError::invalid(format!("unknown log level '{}'", self.level)))
    }

    /// Installs the terminal logger, plus the file logger when `file` is set.
    pub fn init(&self) -> Result<(), BVPError> {
        let level = self.level_filter()?;
        match &self.file {
            Some(path) => init_file_logger(level, path)?,
            None => init_logger(level),
        }
        Ok(())
    }
}

impl BVPConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, BVPError> {
        let config: BVPConfig = toml::from_str(content)?;
        config.logging.level_filter()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BVPError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        info!("configuration loaded from {}", path.as_ref().display());
        Ok(config)
    }
}
