//! Export per-triplet results to CSV.
//!
//! One row per triplet per side, so the file loads straight into a spreadsheet.
//! Unavailable values are empty cells.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::Side;
use crate::error::AppError;
use crate::study::Convergence;

/// Write the study results to a CSV file.
pub fn write_results_csv(path: &Path, study: &Convergence) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(&mut file, study)
}

/// Write the CSV content to any writer.
pub fn write_results<W: Write>(out: &mut W, study: &Convergence) -> Result<(), AppError> {
    let with_analytic = study.analytical().is_some();

    // The field list is the same for every row; take the names from a template.
    let Some(first) = study.iter().next() else {
        writeln!(out, "triplet,grids,side")
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
        return Ok(());
    };

    let names: Vec<&str> = first
        .fields(Side::Fine, with_analytic)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    writeln!(out, "triplet,grids,side,asymptotic_ratio,{}", names.join(","))
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (idx, triplet) in study.iter().enumerate() {
        for side in Side::BOTH {
            let values: Vec<String> = triplet
                .fields(side, with_analytic)
                .into_iter()
                .map(|(_, value)| fmt_opt(value))
                .collect();
            writeln!(
                out,
                "{},{},{},{},{}",
                idx,
                triplet.grids,
                side,
                fmt_opt(triplet.asymptotic_ratio),
                values.join(",")
            )
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.10}")).unwrap_or_default()
}
