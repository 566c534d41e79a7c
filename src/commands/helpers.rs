//! Command helper utilities

use std::path::PathBuf;

use console::Style;

use crate::error::{Result, io_error};
use crate::pipeline::StageReport;

/// Resolve project path from optional argument
///
/// If a project path is provided, use it. Otherwise,
/// resolve to the current directory.
pub fn resolve_project_path(project: Option<PathBuf>) -> Result<PathBuf> {
    match project {
        Some(path) => Ok(path),
        None => std::env::current_dir()
            .map_err(|e| io_error(format!("Failed to get current directory: {e}"))),
    }
}

/// Print a stage report, warnings in yellow
pub fn print_report(report: &StageReport) {
    println!(
        "{} {}",
        Style::new().bold().green().apply_to(format!("{:>10}", report.stage.as_str())),
        report.summary
    );
    for warning in &report.warnings {
        println!(
            "{} {}",
            Style::new().bold().yellow().apply_to(format!("{:>10}", "warning")),
            warning
        );
    }
}

/// Human-readable byte count
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
