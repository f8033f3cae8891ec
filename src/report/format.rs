//! The study report ("verify report").
//!
//! Layout:
//! - header: metric name, grid count and the grid table
//! - discretisation error tables for the fine and coarse pairs
//! - asymptotic ratio table
//! - required resolution, when a query was answered
//! - warnings listing every diagnostic
//! - an "insufficient grids" trailer when no triplet could be formed

use crate::domain::{ResolutionEstimate, Side, TripletResult};
use crate::report::table::{Record, Table, TableLayout};
use crate::study::Convergence;

const ERRORS_LAYOUT: TableLayout = TableLayout {
    col_width: 12,
    decimals: 6,
    line_width: 80,
};

const RATIO_LAYOUT: TableLayout = TableLayout {
    col_width: 16,
    decimals: 6,
    line_width: 80,
};

/// Render the full report. Lines carry no trailing whitespace.
pub fn format_report(study: &Convergence, resolution: Option<&ResolutionEstimate>) -> String {
    let mut lines: Vec<String> = Vec::new();

    write_header(study, &mut lines);

    if !study.is_empty() {
        let fine = errors_table(study, Side::Fine).render(ERRORS_LAYOUT);
        write_section("Discretisation errors for fine grids:", fine, &mut lines);

        let coarse = errors_table(study, Side::Coarse).render(ERRORS_LAYOUT);
        write_section("Discretisation errors for coarse grids:", coarse, &mut lines);

        write_section("Asymptotic ratio test:", ratio_table(study).render(RATIO_LAYOUT), &mut lines);
    }

    if let Some(estimate) = resolution {
        write_resolution(estimate, &mut lines);
    }

    if !study.diagnostics().is_empty() {
        lines.push(String::new());
        lines.push("Warnings:".to_string());
        lines.push(String::new());
        for diagnostic in study.diagnostics() {
            lines.push(format!("  - {diagnostic}"));
        }
        lines.push(String::new());
    }

    if study.is_empty() {
        lines.push(" *** Insufficient grids for analysis ***".to_string());
        lines.push(String::new());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn write_header(study: &Convergence, lines: &mut Vec<String>) {
    lines.push(String::new());

    if let Some(name) = study.metric_name() {
        lines.push(format!("--- Examining metric: {name:>24} ---"));
        lines.push(String::new());
    }

    let grids = study.grid_set().grids();
    lines.push(format!("Number of grids to be examined = {}", grids.len()));
    lines.push(String::new());

    if grids.is_empty() {
        return;
    }

    lines.push("     Grid Size     Quantity".to_string());
    lines.push(String::new());
    for grid in grids {
        lines.push(format!("{:>13.6} {:>13.6}", grid.spacing(), grid.value()));
    }
    lines.push(String::new());
}

fn write_section(title: &str, table: Vec<String>, lines: &mut Vec<String>) {
    lines.push(String::new());
    lines.push(title.to_string());
    lines.push(String::new());
    lines.extend(table);
}

fn write_resolution(estimate: &ResolutionEstimate, lines: &mut Vec<String>) {
    lines.push(String::new());
    lines.push("Required resolution:".to_string());
    lines.push(String::new());
    lines.push(format!(
        "  target GCI = {:.6} ({} grid estimate)",
        estimate.target_gci, estimate.side
    ));
    lines.push(format!("  grid spacing = {:.6}", estimate.spacing));
    lines.push(String::new());
}

fn errors_table(study: &Convergence, side: Side) -> Table {
    let with_analytic = study.analytical().is_some();
    let mut table = Table::new("Grids");
    for triplet in study {
        table.add_record(errors_record(triplet, side, with_analytic));
    }
    table
}

fn errors_record(triplet: &TripletResult, side: Side, with_analytic: bool) -> Record {
    let mut record = Record::new(triplet.grids.clone());
    for (name, value) in triplet.fields(side, with_analytic) {
        record.set(column_heading(name), value);
    }
    record
}

fn ratio_table(study: &Convergence) -> Table {
    let mut table = Table::new("Grids");
    for triplet in study {
        table.add_record(Record::new(triplet.grids.clone()).with("Asymptotic ratio", triplet.asymptotic_ratio));
    }
    table
}

fn column_heading(field: &str) -> &str {
    match field {
        "ratio_21" => "r21",
        "ratio_32" => "r32",
        other => other,
    }
}
