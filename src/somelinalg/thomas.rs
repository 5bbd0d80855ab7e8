use crate::numerical::BVP_errors::BVPError;
use log::error;
use nalgebra::DVector;

/// relative size below which a pivot is treated as zero
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// Thomas algorithm (tridiagonal Gaussian elimination without pivoting), O(n).
///
/// `sub[i]` is A[i+1, i], `diag[i]` is A[i, i], `sup[i]` is A[i, i+1].
/// A pivot smaller than `PIVOT_TOLERANCE` times the magnitude of its original row is a
/// `SingularSystem` error.
pub fn thomas_solve(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    rhs: &DVector<f64>,
) -> Result<DVector<f64>, BVPError> {
    let n = diag.len();
    if n == 0 || sub.len() + 1 != n || sup.len() + 1 != n || rhs.len() != n {
        return Err(BVPError::invalid(format!(
            "inconsistent tridiagonal system: sub {}, diag {}, sup {}, rhs {}",
            sub.len(),
            n,
            sup.len(),
            rhs.len()
        )));
    }
    let row_scale = |i: usize| {
        let mut s = diag[i].abs();
        if i > 0 {
            s = s.max(sub[i - 1].abs());
        }
        if i + 1 < n {
            s = s.max(sup[i].abs());
        }
        s
    };
    let check_pivot = |i: usize, pivot: f64| -> Result<(), BVPError> {
        let scale = row_scale(i);
        if !pivot.is_finite() || pivot.abs() <= PIVOT_TOLERANCE * scale || scale == 0.0 {
            error!("zero pivot {:e} in row {} of tridiagonal system", pivot, i);
            return Err(BVPError::SingularSystem(format!(
                "zero pivot {:e} in row {} (row scale {:e})",
                pivot, i, scale
            )));
        }
        Ok(())
    };

    // forward sweep: c' and d' of the textbook formulation
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];
    check_pivot(0, diag[0])?;
    if n > 1 {
        c_prime[0] = sup[0] / diag[0];
    }
    d_prime[0] = rhs[0] / diag[0];
    for i in 1..n {
        let pivot = diag[i] - sub[i - 1] * c_prime[i - 1];
        check_pivot(i, pivot)?;
        if i + 1 < n {
            c_prime[i] = sup[i] / pivot;
        }
        d_prime[i] = (rhs[i] - sub[i - 1] * d_prime[i - 1]) / pivot;
    }

    let mut x = DVector::zeros(n);
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }
    Ok(x)
}
