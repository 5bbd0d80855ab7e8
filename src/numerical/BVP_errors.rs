//! Error taxonomy shared by the shooting and finite-difference solvers.
//!
//! Non-convergence of the shooting search is not represented here: it is a
//! reported outcome (`success == false` in the result), not a failure.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BVPError {
    /// Rejected before any integration or matrix assembly took place.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The IVP integrator could not advance the state; the solve is aborted.
    #[error("IVP integration failed at x = {x}: {reason}")]
    IntegrationFailure { x: f64, reason: String },
    /// The linear solver met a zero pivot.
    #[error("singular linear system: {0}")]
    SingularSystem(String),
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("plotting error: {0}")]
    Plot(String),
}

impl BVPError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        BVPError::InvalidInput(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, BVPError::InvalidInput(_))
    }

    pub fn is_singular(&self) -> bool {
        matches!(self, BVPError::SingularSystem(_))
    }

    pub fn is_integration_failure(&self) -> bool {
        matches!(self, BVPError::IntegrationFailure { .. })
    }
}
