use crate::numerical::BVP_errors::BVPError;
use log::info;
use nalgebra::{DMatrix, DVector};
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};

fn plot_err<E: std::fmt::Display>(e: E) -> BVPError {
    BVPError::Plot(e.to_string())
}

/// Axis range with a margin so flat curves still get a non-empty range.
fn padded_range(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    let pad = if span > 0.0 { 0.05 * span } else { 0.5 * min.abs().max(1.0) };
    (min - pad, max + pad)
}

/// One line chart written to `filename`.
fn draw_curve(
    filename: &Path,
    arg: &str,
    varname: &str,
    col: usize,
    series: Vec<(f64, f64)>,
    (x_range, y_range): (Range<f64>, Range<f64>),
) -> Result<(), BVPError> {
    let root_area = BitMapBackend::new(filename, (800, 600)).into_drawing_area();
    root_area.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root_area)
        .caption(varname, ("sans-serif", 50))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(30)
        .build_cartesian_2d(x_range, y_range)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(arg)
        .y_desc(varname)
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(series, &Palette99::pick(col)))
        .map_err(plot_err)?
        .label(format!(" {}", varname))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], Palette99::pick(col)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;
    root_area.present().map_err(plot_err)?;
    Ok(())
}

/// Draws every column of `y` against `x`, one png per column named `<header>.png` in `dir`.
/// Returns the paths of the written files.
pub fn plots<P: AsRef<Path>>(
    arg: &str,
    values: &[String],
    x: &DVector<f64>,
    y: &DMatrix<f64>,
    dir: P,
) -> Result<Vec<PathBuf>, BVPError> {
    if y.ncols() != values.len() || y.nrows() != x.len() || x.is_empty() {
        return Err(BVPError::invalid("plot data does not match its labels"));
    }
    let (x_min, x_max) = padded_range(x.min(), x.max());
    let mut written = Vec::with_capacity(values.len());
    for col in 0..y.ncols() {
        let y_col = y.column(col);
        let (y_min, y_max) = padded_range(y_col.min(), y_col.max());
        let varname = &values[col];
        let filename = dir.as_ref().join(format!("{}.png", varname));
        let series: Vec<(f64, f64)> = x.iter().zip(y_col.iter()).map(|(&x, &y)| (x, y)).collect();
        draw_curve(&filename, arg, varname, col, series, (x_min..x_max, y_min..y_max))?;
        info!("plot saved to {}", filename.display());
        written.push(filename);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_of_flat_curve_is_not_empty() {
        let (lo, hi) = padded_range(2.0, 2.0);
        assert!(lo < 2.0 && hi > 2.0);
        let (lo, hi) = padded_range(0.0, 10.0);
        assert_eq!((lo, hi), (-0.5, 10.5));
    }

    #[test]
    fn mismatched_labels_rejected() {
        let x = DVector::from_vec(vec![0.0, 1.0]);
        let y = DMatrix::zeros(2, 2);
        let dir = tempfile::tempdir().unwrap();
        let err = plots("x", &["u".to_string()], &x, &y, dir.path()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn one_png_per_column() {
        let x = DVector::from_fn(11, |i, _| i as f64 / 10.0);
        let y = DMatrix::from_fn(11, 2, |i, j| (j as f64 + 1.0) * x[i]);
        let dir = tempfile::tempdir().unwrap();
        let names = ["u".to_string(), "u_x".to_string()];
        match plots("x", &names, &x, &y, dir.path()) {
            Ok(written) => {
                assert_eq!(written.len(), 2);
                assert_eq!(written[1], dir.path().join("u_x.png"));
                assert!(written.iter().all(|p| p.exists()));
            }
            // no usable font on the machine
            Err(e) => assert!(matches!(e, BVPError::Plot(_)), "{}", e),
        }
    }
}
