use crate::numerical::BVP_errors::BVPError;
use serde::{Deserialize, Serialize};

/// Boundary condition types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryConditionType {
    /// Dirichlet: u = value
    Dirichlet,
    /// Neumann: u' = value
    Neumann,
}

/// Condition imposed at one end of the interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub value: f64,
    pub bc_type: BoundaryConditionType,
}

impl BoundaryCondition {
    pub fn dirichlet(value: f64) -> Self {
        Self {
            value,
            bc_type: BoundaryConditionType::Dirichlet,
        }
    }

    pub fn neumann(value: f64) -> Self {
        Self {
            value,
            bc_type: BoundaryConditionType::Neumann,
        }
    }

    pub fn is_dirichlet(&self) -> bool {
        self.bc_type == BoundaryConditionType::Dirichlet
    }

    pub fn validate(&self, side: &str) -> Result<(), BVPError> {
        if !self.value.is_finite() {
            return Err(BVPError::invalid(format!(
                "{} boundary value must be finite, got {}",
                side, self.value
            )));
        }
        Ok(())
    }
}
