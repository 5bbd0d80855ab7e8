//! Square banded matrix in LAPACK-like band storage.
//!
//! Only the `kl` sub-diagonals, the main diagonal and the `ku` super-diagonals are
//! stored: element A[i, j] lives at `band[(ku + i - j, j)]`, so storage is
//! `(kl + ku + 1) x n` instead of `n x n`.
use crate::numerical::BVP_errors::BVPError;
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, PartialEq)]
pub struct BandMatrix {
    n: usize,
    kl: usize,
    ku: usize,
    band: DMatrix<f64>,
}

impl BandMatrix {
    pub fn zeros(n: usize, kl: usize, ku: usize) -> Self {
        BandMatrix {
            n,
            kl,
            ku,
            band: DMatrix::zeros(kl + ku + 1, n),
        }
    }

    /// Tridiagonal matrix from its three diagonals (`sub` and `sup` have n-1 entries).
    pub fn from_diagonals(sub: &[f64], diag: &[f64], sup: &[f64]) -> Result<Self, BVPError> {
        let n = diag.len();
        if n == 0 || sub.len() + 1 != n || sup.len() + 1 != n {
            return Err(BVPError::invalid(format!(
                "diagonal lengths {} / {} / {} do not form a tridiagonal matrix",
                sub.len(),
                n,
                sup.len()
            )));
        }
        let mut m = BandMatrix::zeros(n, 1, 1);
        for i in 0..n {
            m.band[(1, i)] = diag[i];
            if i + 1 < n {
                m.band[(0, i + 1)] = sup[i];
                m.band[(2, i)] = sub[i];
            }
        }
        Ok(m)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn bandwidths(&self) -> (usize, usize) {
        (self.kl, self.ku)
    }

    fn in_band(&self, i: usize, j: usize) -> bool {
        i < self.n && j < self.n && j + self.kl >= i && i + self.ku >= j
    }

    /// A[i, j]; zero outside the band.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if self.in_band(i, j) {
            self.band[(self.ku + i - j, j)]
        } else {
            0.0
        }
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<(), BVPError> {
        if !self.in_band(i, j) {
            return Err(BVPError::invalid(format!(
                "entry ({}, {}) lies outside the band kl = {}, ku = {} of a {}x{} matrix",
                i, j, self.kl, self.ku, self.n, self.n
            )));
        }
        self.band[(self.ku + i - j, j)] = value;
        Ok(())
    }

    /// Columns holding stored entries of row `i`.
    pub fn row_range(&self, i: usize) -> std::ops::Range<usize> {
        i.saturating_sub(self.kl)..(i + self.ku + 1).min(self.n)
    }

    /// Largest absolute entry of row `i`.
    pub fn row_scale(&self, i: usize) -> f64 {
        self.row_range(i)
            .map(|j| self.get(i, j).abs())
            .fold(0.0, f64::max)
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.n, self.n);
        for i in 0..self.n {
            for j in self.row_range(i) {
                dense[(i, j)] = self.get(i, j);
            }
        }
        dense
    }

    pub fn mul_vector(&self, x: &DVector<f64>) -> Result<DVector<f64>, BVPError> {
        if x.len() != self.n {
            return Err(BVPError::invalid(format!(
                "vector of length {} cannot multiply a {}x{} matrix",
                x.len(),
                self.n,
                self.n
            )));
        }
        Ok(DVector::from_fn(self.n, |i, _| {
            self.row_range(i).map(|j| self.get(i, j) * x[j]).sum()
        }))
    }

    /// (sub, diag, sup) of a matrix with at most one sub- and one super-diagonal.
    pub fn tridiagonal_parts(&self) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), BVPError> {
        for i in 0..self.n {
            for j in self.row_range(i) {
                if (i as isize - j as isize).abs() > 1 && self.get(i, j) != 0.0 {
                    return Err(BVPError::invalid(format!(
                        "matrix is not tridiagonal: A[{}, {}] = {}",
                        i,
                        j,
                        self.get(i, j)
                    )));
                }
            }
        }
        let n = self.n;
        let diag = (0..n).map(|i| self.get(i, i)).collect();
        let sub = (1..n).map(|i| self.get(i, i - 1)).collect();
        let sup = (0..n.saturating_sub(1)).map(|i| self.get(i, i + 1)).collect();
        Ok((sub, diag, sup))
    }

    /// Brings a matrix whose interior rows are tridiagonal, and whose first/last row
    /// reach one column further (one-sided boundary stencils), to tridiagonal form.
    ///
    /// A[0, 2] is eliminated with row 1 and A[n-1, n-3] with row n-2; `rhs` gets the same
    /// row operations.
    pub fn reduce_to_tridiagonal(&self, rhs: &mut DVector<f64>) -> Result<BandMatrix, BVPError> {
        let n = self.n;
        if rhs.len() != n {
            return Err(BVPError::invalid("right-hand side length does not match the matrix"));
        }
        let mut reduced = BandMatrix::zeros(n, 1, 1);
        for i in 0..n {
            for j in i.saturating_sub(1)..(i + 2).min(n) {
                reduced.band[(1 + i - j, j)] = self.get(i, j);
            }
        }
        if n >= 3 {
            let corner = self.get(0, 2);
            if corner != 0.0 {
                let pivot = self.get(1, 2);
                if pivot == 0.0 {
                    return Err(BVPError::SingularSystem(
                        "cannot eliminate A[0, 2]: A[1, 2] is zero".to_string(),
                    ));
                }
                let m = corner / pivot;
                reduced.band[(1, 0)] -= m * self.get(1, 0);
                reduced.band[(0, 1)] -= m * self.get(1, 1);
                rhs[0] -= m * rhs[1];
            }
            let corner = self.get(n - 1, n - 3);
            if corner != 0.0 {
                let pivot = self.get(n - 2, n - 3);
                if pivot == 0.0 {
                    return Err(BVPError::SingularSystem(format!(
                        "cannot eliminate A[{}, {}]: A[{}, {}] is zero",
                        n - 1,
                        n - 3,
                        n - 2,
                        n - 3
                    )));
                }
                let m = corner / pivot;
                reduced.band[(2, n - 2)] -= m * self.get(n - 2, n - 2);
                reduced.band[(1, n - 1)] -= m * self.get(n - 2, n - 1);
                rhs[n - 1] -= m * rhs[n - 2];
            }
        }
        for i in 0..n {
            for j in self.row_range(i) {
                let far = (i as isize - j as isize).abs() > 1;
                let is_corner = (i == 0 && j == 2) || (i + 1 == n && j + 3 == n);
                if far && !is_corner && self.get(i, j) != 0.0 {
                    return Err(BVPError::invalid(format!(
                        "row {} is not tridiagonal and cannot be reduced",
                        i
                    )));
                }
            }
        }
        Ok(reduced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> BandMatrix {
        // [ 2 -1  0  0 ]
        // [-1  2 -1  0 ]
        // [ 0 -1  2 -1 ]
        // [ 0  0 -1  2 ]
        BandMatrix::from_diagonals(&[-1.0; 3], &[2.0; 4], &[-1.0; 3]).unwrap()
    }

    #[test]
    fn band_access_and_dense_view() {
        let mut m = sample();
        assert_eq!(m.get(0, 0), 2.0);
        assert_eq!(m.get(2, 1), -1.0);
        assert_eq!(m.get(0, 3), 0.0);
        assert!(m.set(0, 3, 1.0).unwrap_err().is_invalid_input());
        m.set(3, 2, -0.5).unwrap();
        let dense = m.to_dense();
        assert_eq!(dense[(3, 2)], -0.5);
        assert_eq!(dense[(1, 0)], -1.0);
        assert_eq!(dense[(0, 2)], 0.0);
    }

    #[test]
    fn product_matches_dense() {
        let m = sample();
        let x = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let y = m.mul_vector(&x).unwrap();
        assert_eq!(y, m.to_dense() * &x);
        assert!(m.mul_vector(&DVector::zeros(3)).is_err());
    }

    #[test]
    fn tridiagonal_parts_round_trip() {
        let (sub, diag, sup) = sample().tridiagonal_parts().unwrap();
        assert_eq!(sub, vec![-1.0; 3]);
        assert_eq!(diag, vec![2.0; 4]);
        assert_eq!(sup, vec![-1.0; 3]);

        let mut wide = BandMatrix::zeros(4, 2, 2);
        wide.set(0, 2, 1.0).unwrap();
        assert!(wide.tridiagonal_parts().is_err());
    }

    #[test]
    fn one_sided_rows_are_reduced() {
        let n = 5;
        let h = 0.5;
        let mut m = BandMatrix::zeros(n, 2, 2);
        for i in 1..n - 1 {
            m.set(i, i - 1, 1.0 / (h * h)).unwrap();
            m.set(i, i, -2.0 / (h * h)).unwrap();
            m.set(i, i + 1, 1.0 / (h * h)).unwrap();
        }
        m.set(0, 0, -3.0 / (2.0 * h)).unwrap();
        m.set(0, 1, 4.0 / (2.0 * h)).unwrap();
        m.set(0, 2, -1.0 / (2.0 * h)).unwrap();
        m.set(n - 1, n - 3, 1.0 / (2.0 * h)).unwrap();
        m.set(n - 1, n - 2, -4.0 / (2.0 * h)).unwrap();
        m.set(n - 1, n - 1, 3.0 / (2.0 * h)).unwrap();

        let x = DVector::from_vec(vec![1.0, -2.0, 0.5, 3.0, 1.5]);
        let mut rhs = m.mul_vector(&x).unwrap();
        let reduced = m.reduce_to_tridiagonal(&mut rhs).unwrap();
        assert_eq!(reduced.bandwidths(), (1, 1));
        assert_abs_diff_eq!(reduced.get(0, 0), -1.0 / h, epsilon = 1e-12);
        assert_abs_diff_eq!(reduced.get(0, 1), 1.0 / h, epsilon = 1e-12);
        assert_abs_diff_eq!(reduced.get(n - 1, n - 2), -1.0 / h, epsilon = 1e-12);
        assert_abs_diff_eq!(reduced.get(n - 1, n - 1), 1.0 / h, epsilon = 1e-12);
        // same solution set: x still satisfies the reduced system
        let check = reduced.mul_vector(&x).unwrap();
        for i in 0..n {
            assert_abs_diff_eq!(check[i], rhs[i], epsilon = 1e-12);
        }
    }
}
