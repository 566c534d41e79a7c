//! Pipeline stage commands
//!
//! Each stage command opens the project's pipeline for the requested
//! platform, runs the stage and prints its report. `all` runs every stage in
//! order and stops at the first failure.

use std::path::PathBuf;

use console::Style;

use super::helpers::{print_report, resolve_project_path};
use crate::cli::StageArgs;
use crate::error::Result;
use crate::pipeline::{Pipeline, Stage};

/// Run a single stage
pub fn run(project: Option<PathBuf>, stage: Stage, args: StageArgs) -> Result<()> {
    let pipeline = open(project, &args)?;
    let report = pipeline.run(stage)?;
    print_report(&report);
    Ok(())
}

/// Run every stage in order
pub fn run_all(project: Option<PathBuf>, args: StageArgs) -> Result<()> {
    let pipeline = open(project, &args)?;
    let mut warnings = 0;
    for stage in Stage::ALL {
        let report = pipeline.run(stage)?;
        print_report(&report);
        warnings += report.warnings.len();
    }

    let status = if warnings == 0 {
        Style::new().bold().green().apply_to(String::from("done"))
    } else {
        Style::new()
            .bold()
            .yellow()
            .apply_to(format!("done with {warnings} warning(s)"))
    };
    println!(
        "\n{} {}",
        status,
        Style::new()
            .dim()
            .apply_to(pipeline.layout().dist_dir().display().to_string())
    );
    Ok(())
}

fn open(project: Option<PathBuf>, args: &StageArgs) -> Result<Pipeline> {
    let project_dir = resolve_project_path(project)?;
    Pipeline::open(&project_dir, args.platform)
}
