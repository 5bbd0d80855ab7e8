//! Pretty-printed tables of solutions and convergence histories.
use nalgebra::{DMatrix, DVector};
use tabled::{builder::Builder, settings::Style};

/// Table with the abscissa column `arg` followed by one column per header.
pub fn solution_table(arg: &str, headers: &[String], x: &DVector<f64>, y: &DMatrix<f64>) -> String {
    let mut builder = Builder::default();
    let mut header = vec![arg.to_string()];
    header.extend(headers.iter().cloned());
    builder.push_record(header);
    for (i, row) in y.row_iter().enumerate().take(x.len()) {
        let mut record = vec![format!("{}", x[i])];
        record.extend(row.iter().map(|v| format!("{:.10}", v)));
        builder.push_record(record);
    }
    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

/// Iteration number with the residual of that iteration.
pub fn convergence_table(residuals: &[f64]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["iteration".to_string(), "residual".to_string()]);
    for (i, r) in residuals.iter().enumerate() {
        builder.push_record([(i + 1).to_string(), format!("{:e}", r)]);
    }
    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

/// Grid sizes, maximum errors and successive error ratios of a refinement study.
pub fn refinement_table(dx: &[f64], max_errors: &[f64]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["dx", "max error", "ratio"].map(String::from));
    for (i, (h, e)) in dx.iter().zip(max_errors.iter()).enumerate() {
        let ratio = if i == 0 {
            "-".to_string()
        } else {
            format!("{:.4}", max_errors[i - 1] / e)
        };
        builder.push_record([format!("{:.6e}", h), format!("{:.6e}", e), ratio]);
    }
    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}
