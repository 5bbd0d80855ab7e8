use log::{info, warn};
use nalgebra::{DMatrix, DVector, stack};

/// Rouché–Capelli theorem: A x = b has a solution if and only if rank(A) == rank([A b]).
pub fn Rouche_Capelli_theorem(A: &DMatrix<f64>, b: &DVector<f64>) -> bool {
    let Ab: DMatrix<f64> = stack![A, b];
    let eps = rank_tolerance(A);
    let rank_A = A.rank(eps);
    let rank_Ab = Ab.rank(eps);

    let result = rank_A == rank_Ab;
    if !result {
        warn!(
            "The system has no solution. rank(A) = {} != rank([A b]) = {}",
            rank_A, rank_Ab
        );
    }
    result
}

fn rank_tolerance(A: &DMatrix<f64>) -> f64 {
    let n = A.nrows().max(A.ncols()) as f64;
    n * f64::EPSILON * A.amax().max(1.0)
}

/// Ratio of the largest to the smallest singular value; infinite for a singular matrix.
pub fn condition_number(A: &DMatrix<f64>) -> f64 {
    let singular_values = A.singular_values();
    let max_sigma = singular_values.max();
    let min_sigma = singular_values.min();
    if min_sigma == 0.0 {
        f64::INFINITY
    } else {
        max_sigma / min_sigma
    }
}

pub fn poorly_conditioned(A: &DMatrix<f64>, threshold: f64) -> bool {
    let condition_number = condition_number(A);
    let poorly_conditioned = condition_number > threshold;
    if poorly_conditioned {
        warn!(
            "The system of linear equations is poorly conditioned. Condition number = {:.2e}",
            condition_number
        );
    }
    poorly_conditioned
}

/// Outcome of [`linear_system_diagnostics`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemDiagnostics {
    pub rank: usize,
    pub solvable: bool,
    pub condition_number: f64,
    pub poorly_conditioned: bool,
}

/// Rank test and condition number of a (dense copy of a) linear system.
/// Both are O(n^3), meant for small systems.
pub fn linear_system_diagnostics(A: &DMatrix<f64>, b: &DVector<f64>, threshold: f64) -> SystemDiagnostics {
    let solvable = Rouche_Capelli_theorem(A, b);
    let rank = A.rank(rank_tolerance(A));
    let condition_number = condition_number(A);
    let poorly_conditioned = poorly_conditioned(A, threshold);
    if rank < A.nrows() {
        warn!(
            "The coefficient matrix is rank deficient: rank {} of {}",
            rank,
            A.nrows()
        );
    }
    info!(
        "linear system diagnostics: order {}, rank {}, condition number {:.3e}",
        A.nrows(),
        rank,
        condition_number
    );
    SystemDiagnostics {
        rank,
        solvable,
        condition_number,
        poorly_conditioned,
    }
}
