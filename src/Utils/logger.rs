//! Logger setup and saving of solution tables.
use crate::numerical::BVP_errors::BVPError;
use csv::Writer;
use log::info;
use nalgebra::{DMatrix, DVector};
use simplelog::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Terminal logger at `level`. Repeated calls are harmless: only the first one installs a logger.
pub fn init_logger(level: LevelFilter) {
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

/// Terminal logger plus a copy of the log written to `log_file`.
pub fn init_file_logger<P: AsRef<Path>>(level: LevelFilter, log_file: P) -> Result<(), BVPError> {
    let file = File::create(log_file)?;
    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), file),
    ];
    let _ = CombinedLogger::init(loggers);
    Ok(())
}

fn header_row(headers: &[String], arg: &str) -> Vec<String> {
    let mut headers_with_x = Vec::with_capacity(headers.len() + 1);
    headers_with_x.push(arg.to_string());
    headers_with_x.extend(headers.iter().cloned());
    headers_with_x
}

fn check_shape(matrix: &DMatrix<f64>, headers: &[String], x_mesh: &DVector<f64>) -> Result<(), BVPError> {
    if matrix.nrows() != x_mesh.len() || matrix.ncols() != headers.len() {
        return Err(BVPError::invalid(format!(
            "table of {}x{} values does not match {} abscissae and {} headers",
            matrix.nrows(),
            matrix.ncols(),
            x_mesh.len(),
            headers.len()
        )));
    }
    Ok(())
}

/// Tab separated text file: header line, then one line per abscissa.
pub fn save_matrix_to_file<P: AsRef<Path>>(
    matrix: &DMatrix<f64>,
    headers: &[String],
    filename: P,
    x_mesh: &DVector<f64>,
    arg: &str,
) -> Result<(), BVPError> {
    check_shape(matrix, headers, x_mesh)?;
    let mut file = File::create(filename.as_ref())?;
    writeln!(file, "{}", header_row(headers, arg).join("\t"))?;
    for (i, row) in matrix.row_iter().enumerate() {
        let mut row_data = Vec::with_capacity(row.len() + 1);
        row_data.push(x_mesh[i].to_string());
        row_data.extend(row.iter().map(|&val| val.to_string()));
        writeln!(file, "{}", row_data.join("\t"))?;
    }
    info!("result saved to {}", filename.as_ref().display());
    Ok(())
}

/// CSV file with columns `arg, headers...`.
pub fn save_matrix_to_csv<P: AsRef<Path>>(
    matrix: &DMatrix<f64>,
    headers: &[String],
    filename: P,
    x_mesh: &DVector<f64>,
    arg: &str,
) -> Result<(), BVPError> {
    check_shape(matrix, headers, x_mesh)?;
    let mut writer = Writer::from_path(filename.as_ref())?;
    writer.write_record(header_row(headers, arg))?;
    for (i, row) in matrix.row_iter().enumerate() {
        let mut row_data = Vec::with_capacity(row.len() + 1);
        row_data.push(x_mesh[i].to_string());
        row_data.extend(row.iter().map(|&val| val.to_string()));
        writer.write_record(&row_data)?;
    }
    writer.flush()?;
    info!("result saved to {}", filename.as_ref().display());
    Ok(())
}
