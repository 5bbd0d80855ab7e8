use crate::numerical::BVP_errors::BVPError;
use nalgebra::DVector;

/// Uniform grid on [a, b] with `n_interior` interior points and spacing dx = (b - a)/(n_interior + 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformGrid {
    pub a: f64,
    pub b: f64,
    pub n_interior: usize,
    pub dx: f64,
}

impl UniformGrid {
    pub fn new(a: f64, b: f64, n_interior: usize) -> Result<Self, BVPError> {
        if n_interior == 0 {
            return Err(BVPError::invalid("grid resolution N must be at least 1"));
        }
        if !a.is_finite() || !b.is_finite() || !(a < b) {
            return Err(BVPError::invalid(format!(
                "interval must be finite with a < b, got [{}, {}]",
                a, b
            )));
        }
        Ok(UniformGrid {
            a,
            b,
            n_interior,
            dx: (b - a) / (n_interior as f64 + 1.0),
        })
    }

    /// N + 2
    pub fn n_total(&self) -> usize {
        self.n_interior + 2
    }

    /// Abscissa of grid index `i`, 0 and N+1 being the boundaries.
    pub fn point(&self, i: usize) -> f64 {
        if i + 1 >= self.n_total() {
            self.b
        } else {
            self.a + i as f64 * self.dx
        }
    }

    pub fn interior_points(&self) -> DVector<f64> {
        DVector::from_fn(self.n_interior, |i, _| self.point(i + 1))
    }

    /// All N + 2 points, boundaries included and exact.
    pub fn all_points(&self) -> DVector<f64> {
        DVector::from_fn(self.n_total(), |i, _| self.point(i))
    }
}
