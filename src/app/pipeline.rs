//! The study pipeline shared by the binary and library callers.
//!
//! grid file -> study -> optional resolution query -> report file -> exports
//!
//! A failed resolution query does not stop the report or the exports from
//! being written; its error is returned after they are on disk.

use std::fs;

use log::info;

use crate::domain::{Grid, ResolutionEstimate, StudyConfig};
use crate::error::AppError;
use crate::io::{read_grids, write_results_csv, write_study_json};
use crate::report::format_report;
use crate::study::Convergence;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub study: Convergence,
    pub resolution: Option<ResolutionEstimate>,
    pub report: String,
}

/// Read the grid file named in `config` and run the full pipeline.
pub fn run_study(config: &StudyConfig) -> Result<RunOutput, AppError> {
    let grids = read_grids(&config.input_path)?;
    info!("read {} grid(s) from '{}'", grids.len(), config.input_path.display());
    run_study_with_grids(config, grids)
}

/// Run the pipeline on grids that are already in memory.
pub fn run_study_with_grids(config: &StudyConfig, grids: Vec<Grid>) -> Result<RunOutput, AppError> {
    let study = build_study(config, grids);

    let resolution = match config.target_gci {
        Some(target_gci) => study
            .get_resolution(target_gci, config.resolution_side)
            .map(|spacing| {
                Some(ResolutionEstimate {
                    target_gci,
                    side: config.resolution_side,
                    spacing,
                })
            })
            .map_err(AppError::from),
        None => Ok(None),
    };
    let estimate = resolution.as_ref().ok().copied().flatten();

    let report = format_report(&study, estimate.as_ref());
    fs::write(&config.output_path, &report).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to write report '{}': {e}", config.output_path.display()),
        )
    })?;
    info!("report written to '{}'", config.output_path.display());

    if let Some(path) = &config.export_csv {
        write_results_csv(path, &study)?;
    }
    if let Some(path) = &config.export_json {
        write_study_json(path, &study, estimate)?;
    }

    let resolution = resolution?;
    Ok(RunOutput {
        study,
        resolution,
        report,
    })
}

fn build_study(config: &StudyConfig, grids: Vec<Grid>) -> Convergence {
    let mut study = Convergence::new()
        .with_zero_tol(config.zero_tol)
        .with_solver(config.solver);
    if let Some(name) = &config.metric_name {
        study = study.with_metric_name(name.clone());
    }
    if let Some(value) = config.analytical {
        study = study.with_analytical(value);
    }
    study.add_grids(grids);
    study
}
