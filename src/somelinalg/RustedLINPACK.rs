/// LU decomposition with partial pivoting working directly on band storage
pub mod lu_band_nalg;
