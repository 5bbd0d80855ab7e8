//! Grid refinement study: max error against a known solution on a sequence of grids.
//! For a second-order scheme each halving of dx divides the error by about 4.
use crate::numerical::BVP_errors::BVPError;
use crate::numerical::FD_BVP::FD_api::FDSolution;
use crate::Utils::tables::refinement_table;
use itertools::Itertools;
use log::info;

#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceStudy {
    pub n_interior: Vec<usize>,
    pub dx: Vec<f64>,
    pub max_errors: Vec<f64>,
}

impl ConvergenceStudy {
    /// e_k / e_{k+1} for successive grids
    pub fn error_ratios(&self) -> Vec<f64> {
        self.max_errors
            .iter()
            .tuple_windows()
            .map(|(coarse, fine)| coarse / fine)
            .collect()
    }

    /// log(e_k / e_{k+1}) / log(dx_k / dx_{k+1})
    pub fn observed_orders(&self) -> Vec<f64> {
        self.max_errors
            .iter()
            .zip(self.dx.iter())
            .tuple_windows()
            .map(|((e0, h0), (e1, h1))| (e0 / e1).ln() / (h0 / h1).ln())
            .collect()
    }

    pub fn to_table(&self) -> String {
        refinement_table(&self.dx, &self.max_errors)
    }
}

/// Runs `solve` for every grid resolution in `ns` (strictly increasing) and records the
/// max error against `exact`.
pub fn convergence_study<E, S>(ns: &[usize], exact: E, mut solve: S) -> Result<ConvergenceStudy, BVPError>
where
    E: Fn(f64) -> f64,
    S: FnMut(usize) -> Result<FDSolution, BVPError>,
{
    if ns.len() < 2 {
        return Err(BVPError::invalid("a convergence study needs at least two grids"));
    }
    if !ns.iter().tuple_windows().all(|(a, b)| a < b) {
        return Err(BVPError::invalid(format!(
            "grid resolutions must be strictly increasing, got {:?}",
            ns
        )));
    }
    let mut study = ConvergenceStudy {
        n_interior: ns.to_vec(),
        dx: Vec::with_capacity(ns.len()),
        max_errors: Vec::with_capacity(ns.len()),
    };
    for &n in ns {
        let solution = solve(n)?;
        let err = solution.max_error(&exact);
        info!("N = {}, dx = {:e}, max error = {:e}", n, solution.dx, err);
        study.dx.push(solution.dx);
        study.max_errors.push(err);
    }
    info!("observed orders of accuracy: {:?}", study.observed_orders());
    Ok(study)
}
