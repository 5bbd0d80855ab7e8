#![allow(non_snake_case)]
use crate::numerical::BVP_errors::BVPError;
use crate::somelinalg::band_matrix::BandMatrix;
use crate::somelinalg::thomas::PIVOT_TOLERANCE;
use log::{debug, error};
use nalgebra::DVector;

/// LU decomposition with partial (row) pivoting of a banded matrix.
///
/// Works directly on band storage with `kl` extra rows for the fill-in that row swaps
/// produce, so U has at most `kl + ku` super-diagonals. Cost is O(n kl (kl + ku)) time
/// and O(n (2 kl + ku)) memory.
/// Element (i, j) of the working matrix lives at `lu[(kl + ku + i - j, j)]`; multipliers
/// of L are stored below the diagonal in the same array.
#[derive(Debug, Clone)]
pub struct BandLU {
    n: usize,
    kl: usize,
    ku: usize,
    lu: nalgebra::DMatrix<f64>,
    /// pivot row chosen at each elimination step
    p: Vec<usize>,
}

impl BandLU {
    pub fn new(matrix: &BandMatrix) -> Result<BandLU, BVPError> {
        let n = matrix.n();
        let (kl, ku) = matrix.bandwidths();
        if n == 0 {
            return Err(BVPError::invalid("cannot factorize an empty matrix"));
        }
        let mut lu = nalgebra::DMatrix::zeros(2 * kl + ku + 1, n);
        for i in 0..n {
            for j in matrix.row_range(i) {
                lu[(kl + ku + i - j, j)] = matrix.get(i, j);
            }
        }
        let smallest_row_scale = (0..n).map(|i| matrix.row_scale(i)).fold(f64::INFINITY, f64::min);
        let mut factorization = BandLU {
            n,
            kl,
            ku,
            lu,
            p: (0..n).collect(),
        };
        factorization.LU(smallest_row_scale)?;
        Ok(factorization)
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        self.lu[(self.kl + self.ku + i - j, j)]
    }

    fn at_mut(&mut self, i: usize, j: usize) -> &mut f64 {
        &mut self.lu[(self.kl + self.ku + i - j, j)]
    }

    /// Gaussian elimination column by column: pick the largest entry among rows
    /// `i..=i+kl` as pivot, swap it into row `i`, then eliminate below it.
    fn LU(&mut self, smallest_row_scale: f64) -> Result<(), BVPError> {
        let (n, kl, ku) = (self.n, self.kl, self.ku);
        let threshold = PIVOT_TOLERANCE * smallest_row_scale;
        for i in 0..n {
            let lower_border = (i + kl + 1).min(n);
            let right_border = (i + kl + ku + 1).min(n);
            let mut piv = i;
            for r in i + 1..lower_border {
                if self.at(r, i).abs() > self.at(piv, i).abs() {
                    piv = r;
                }
            }
            let diag = self.at(piv, i);
            if !diag.is_finite() || diag.abs() <= threshold || smallest_row_scale == 0.0 {
                error!("zero pivot {:e} in column {} of banded LU", diag, i);
                return Err(BVPError::SingularSystem(format!(
                    "zero pivot {:e} in column {} (threshold {:e})",
                    diag, i, threshold
                )));
            }
            if piv != i {
                self.p[i] = piv;
                for j in i..right_border {
                    let tmp = self.at(i, j);
                    *self.at_mut(i, j) = self.at(piv, j);
                    *self.at_mut(piv, j) = tmp;
                }
            }
            let inv_diag = 1.0 / diag;
            for r in i + 1..lower_border {
                let coeff = self.at(r, i) * inv_diag;
                *self.at_mut(r, i) = coeff;
                if coeff != 0.0 {
                    for j in i + 1..right_border {
                        let upd = self.at(r, j) - coeff * self.at(i, j);
                        *self.at_mut(r, j) = upd;
                    }
                }
            }
        }
        debug!("banded LU of order {} with kl = {}, ku = {} done", n, kl, ku);
        Ok(())
    }

    pub fn solve(&self, b: &DVector<f64>) -> Result<DVector<f64>, BVPError> {
        if b.len() != self.n {
            return Err(BVPError::invalid(format!(
                "right-hand side of length {} for a system of order {}",
                b.len(),
                self.n
            )));
        }
        let mut x = b.clone_owned();
        self.solve_mut(&mut x);
        Ok(x)
    }

    fn solve_mut(&self, b: &mut DVector<f64>) {
        let (n, kl, ku) = (self.n, self.kl, self.ku);
        // L y = P b, row swaps applied in elimination order
        for i in 0..n {
            if self.p[i] != i {
                b.swap_rows(i, self.p[i]);
            }
            let bi = b[i];
            for r in i + 1..(i + kl + 1).min(n) {
                b[r] -= self.at(r, i) * bi;
            }
        }
        // U x = y
        for i in (0..n).rev() {
            let mut s = b[i];
            for j in i + 1..(i + kl + ku + 1).min(n) {
                s -= self.at(i, j) * b[j];
            }
            b[i] = s / self.at(i, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::DMatrix;

    fn banded_from_dense(a: &DMatrix<f64>, kl: usize, ku: usize) -> BandMatrix {
        let n = a.nrows();
        let mut m = BandMatrix::zeros(n, kl, ku);
        for i in 0..n {
            for j in m.row_range(i) {
                m.set(i, j, a[(i, j)]).unwrap();
            }
        }
        m
    }

    #[test]
    fn matches_dense_lu_with_pivoting() {
        // small diagonal forces row swaps
        let a = DMatrix::from_row_slice(
            5,
            5,
            &[
                1e-3, 2.0, 1.0, 0.0, 0.0, //
                3.0, 1e-3, 4.0, 1.0, 0.0, //
                1.0, 5.0, 1e-3, 2.0, 1.0, //
                0.0, 2.0, 6.0, 1e-3, 3.0, //
                0.0, 0.0, 1.0, 7.0, 1e-3,
            ],
        );
        let m = banded_from_dense(&a, 2, 2);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let lu = BandLU::new(&m).unwrap();
        assert!(lu.p.iter().enumerate().any(|(i, &p)| p != i));
        let x = lu.solve(&b).unwrap();
        let x_dense = a.clone().lu().solve(&b).unwrap();
        for i in 0..5 {
            assert_abs_diff_eq!(x[i], x_dense[i], epsilon = 1e-10);
        }
        let residual = &a * &x - &b;
        assert!(residual.amax() < 1e-10);
    }

    #[test]
    fn tridiagonal_system() {
        let n = 50;
        let m = BandMatrix::from_diagonals(&vec![1.0; n - 1], &vec![-2.0; n], &vec![1.0; n - 1]).unwrap();
        let x_true = DVector::from_fn(n, |i, _| i as f64);
        let b = m.mul_vector(&x_true).unwrap();
        let x = BandLU::new(&m).unwrap().solve(&b).unwrap();
        for i in 0..n {
            assert_abs_diff_eq!(x[i], x_true[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn singular_matrix_detected() {
        let m = BandMatrix::from_diagonals(&[1.0, 1.0], &[-1.0, -2.0, -1.0], &[1.0, 1.0]).unwrap();
        assert!(BandLU::new(&m).unwrap_err().is_singular());
        let zero = BandMatrix::zeros(3, 1, 1);
        assert!(BandLU::new(&zero).unwrap_err().is_singular());
    }

    #[test]
    fn wrong_rhs_length() {
        let m = BandMatrix::from_diagonals(&[1.0], &[2.0, 2.0], &[1.0]).unwrap();
        let lu = BandLU::new(&m).unwrap();
        assert!(lu.solve(&DVector::zeros(3)).unwrap_err().is_invalid_input());
    }
}
