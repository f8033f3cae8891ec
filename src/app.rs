//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initialises logging
//! - runs the study and writes the report
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::cli::Cli;
use crate::domain::StudyConfig;
use crate::error::AppError;
use crate::math::SolverOptions;

pub mod pipeline;

/// Entry point for the `grid-convergence` binary.
pub fn run() -> Result<(), AppError> {
    // Environment fallbacks for clap need to be in place before parsing.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = study_config_from_args(&cli);
    let run = pipeline::run_study(&config)?;

    if config.print_report {
        print!("{}", run.report);
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    // A logger may already be installed (e.g. when embedded); keep that one.
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .ok();
}

pub fn study_config_from_args(args: &Cli) -> StudyConfig {
    StudyConfig {
        input_path: args.file.clone(),
        output_path: args.out.clone(),
        metric_name: args.metric.clone(),
        analytical: args.analytical,
        zero_tol: args.zero_tol,
        solver: SolverOptions {
            relaxation: args.relaxation,
            tolerance: args.tolerance,
            max_iterations: args.max_iterations,
        },
        target_gci: args.target_gci,
        resolution_side: args.side,
        print_report: args.print,
        export_csv: args.export_csv.clone(),
        export_json: args.export_json.clone(),
    }
}

/// Config for a plain run: default settings, no query and no exports.
pub fn default_config(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> StudyConfig {
    StudyConfig {
        input_path: input_path.into(),
        output_path: output_path.into(),
        metric_name: None,
        analytical: None,
        zero_tol: crate::domain::DEFAULT_ZERO_TOL,
        solver: SolverOptions::default(),
        target_gci: None,
        resolution_side: crate::domain::Side::Fine,
        print_report: false,
        export_csv: None,
        export_json: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;

    #[test]
    fn config_from_args_maps_every_flag() {
        let cli = Cli::try_parse_from([
            "grid-convergence",
            "g.txt",
            "--relaxation",
            "0.3",
            "--tolerance",
            "1e-6",
            "--max-iterations",
            "50",
            "--zero-tol",
            "0.01",
            "--target-gci",
            "0.002",
            "--side",
            "coarse",
        ])
        .unwrap();
        let config = study_config_from_args(&cli);

        assert_eq!(config.input_path, PathBuf::from("g.txt"));
        assert_eq!(config.output_path, PathBuf::from("verify_report.txt"));
        assert_eq!(config.zero_tol, 0.01);
        assert_eq!(
            config.solver,
            SolverOptions {
                relaxation: 0.3,
                tolerance: 1e-6,
                max_iterations: 50
            }
        );
        assert_eq!(config.target_gci, Some(0.002));
        assert_eq!(config.resolution_side, Side::Coarse);
    }

    #[test]
    fn default_config_matches_cli_defaults() {
        let cli = Cli::try_parse_from(["grid-convergence", "g.txt"]).unwrap();
        let from_cli = study_config_from_args(&cli);
        let plain = default_config("g.txt", "verify_report.txt");
        assert_eq!(from_cli.solver, plain.solver);
        assert_eq!(from_cli.zero_tol, plain.zero_tol);
        assert_eq!(from_cli.output_path, plain.output_path);
    }
}
