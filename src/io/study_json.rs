//! Study JSON export.
//!
//! A self-describing snapshot of a run:
//! - tool name and generation time
//! - the settings the study ran with
//! - every grid (including those filtered as near-zero)
//! - triplet results, diagnostics and the optional resolution estimate

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Diagnostic, Grid, ResolutionEstimate, TripletResult};
use crate::error::AppError;
use crate::study::Convergence;

#[derive(Debug, Clone, Serialize)]
pub struct StudySettings {
    pub metric_name: Option<String>,
    pub analytical: Option<f64>,
    pub zero_tol: f64,
    pub relaxation: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

/// Serialized form of a finished study.
#[derive(Debug, Clone, Serialize)]
pub struct StudyFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub settings: StudySettings,
    pub grids: Vec<Grid>,
    pub triplets: Vec<TripletResult>,
    pub diagnostics: Vec<Diagnostic>,
    pub resolution: Option<ResolutionEstimate>,
}

impl StudyFile {
    pub fn new(study: &Convergence, resolution: Option<ResolutionEstimate>, generated_at: DateTime<Utc>) -> Self {
        let solver = study.solver();
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            generated_at,
            settings: StudySettings {
                metric_name: study.metric_name().map(str::to_string),
                analytical: study.analytical(),
                zero_tol: study.grid_set().zero_tol(),
                relaxation: solver.relaxation,
                tolerance: solver.tolerance,
                max_iterations: solver.max_iterations,
            },
            grids: study.grid_set().grids().to_vec(),
            triplets: study.results().to_vec(),
            diagnostics: study.diagnostics().to_vec(),
            resolution,
        }
    }
}

/// Write a study JSON file.
pub fn write_study_json(
    path: &Path,
    study: &Convergence,
    resolution: Option<ResolutionEstimate>,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create study JSON '{}': {e}", path.display())))?;

    let doc = StudyFile::new(study, resolution, Utc::now());
    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write study JSON: {e}")))?;

    Ok(())
}
