//! Grid file ingest.
//!
//! One grid per line, written as two whitespace-separated numbers: `spacing value`.
//! Blank lines and lines starting with `#` are skipped. Anything else that is
//! not a valid grid is a hard error (exit code 2) naming the line.

use std::fs;
use std::path::Path;

use crate::domain::Grid;
use crate::error::AppError;

/// Read and parse a grid file.
pub fn read_grids(path: &Path) -> Result<Vec<Grid>, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read grid file '{}': {e}", path.display())))?;
    parse_grids(&text)
}

/// Parse grid text.
pub fn parse_grids(text: &str) -> Result<Vec<Grid>, AppError> {
    let mut grids = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [spacing, value] = fields.as_slice() else {
            return Err(AppError::new(
                2,
                format!("Line {line_no}: expected 2 fields (spacing value), found {}", fields.len()),
            ));
        };

        let spacing = parse_number(spacing, "spacing", line_no)?;
        let value = parse_number(value, "value", line_no)?;
        let grid = Grid::new(spacing, value).map_err(|e| AppError::new(2, format!("Line {line_no}: {e}")))?;
        grids.push(grid);
    }

    Ok(grids)
}

fn parse_number(field: &str, what: &str, line_no: usize) -> Result<f64, AppError> {
    field
        .parse::<f64>()
        .map_err(|_| AppError::new(2, format!("Line {line_no}: invalid {what} '{field}'")))
}
