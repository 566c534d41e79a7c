//! Inspect command implementation
//!
//! Summarizes the artifacts the last build left for a platform: the runtime
//! catalog, the shipped bundle catalog and the remote download set. Missing
//! artifacts are reported with the stage that produces them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use console::Style;

use super::helpers::{format_size, resolve_project_path};
use crate::catalog::Catalog;
use crate::cli::InspectArgs;
use crate::config::{BundleCatalog, BundleLocation, Downloadables};
use crate::domain::LocationType;
use crate::error::Result;
use crate::pipeline::{Pipeline, Stage};

/// Run inspect command
pub fn run(project: Option<PathBuf>, args: InspectArgs) -> Result<()> {
    let project_dir = resolve_project_path(project)?;
    let pipeline = Pipeline::open(&project_dir, args.platform)?;
    let layout = pipeline.layout();

    let catalog = read_if_present(&layout.runtime_catalog(), Catalog::read_file)?;
    let bundles = read_if_present(&layout.bundle_catalog(), BundleCatalog::read)?;
    let downloadables = read_if_present(&layout.downloadables(), Downloadables::read)?;

    println!(
        "{} {}",
        Style::new().bold().apply_to("Platform:"),
        Style::new().cyan().apply_to(pipeline.platform())
    );
    print_catalog(catalog.as_ref(), args.detailed);
    print_bundles(bundles.as_ref(), args.detailed);
    print_downloadables(downloadables.as_ref());
    Ok(())
}

fn read_if_present<T>(path: &Path, read: impl FnOnce(&Path) -> Result<T>) -> Result<Option<T>> {
    if path.is_file() {
        read(path).map(Some)
    } else {
        Ok(None)
    }
}

fn print_missing(stage: Stage) {
    println!(
        "  {}",
        Style::new()
            .dim()
            .apply_to(format!("not built (run 'addressable {stage}')"))
    );
}

/// Entry counts per location type
fn count_by_location(catalog: &Catalog) -> BTreeMap<LocationType, usize> {
    let mut counts = BTreeMap::new();
    for entry in catalog.entries() {
        *counts.entry(entry.location).or_insert(0) += 1;
    }
    counts
}

fn print_catalog(catalog: Option<&Catalog>, detailed: bool) {
    println!("{}", Style::new().bold().apply_to("Catalog:"));
    let Some(catalog) = catalog else {
        print_missing(Stage::Compile);
        return;
    };

    let scenes = catalog.entries().filter(|entry| entry.is_scene()).count();
    println!(
        "  {} entries, {} scenes, {} groups",
        catalog.len(),
        scenes,
        catalog.groups().len()
    );
    for (location, count) in count_by_location(catalog) {
        println!("    {} {}", Style::new().cyan().apply_to(location), count);
    }

    if detailed {
        for entry in catalog.entries() {
            let owner = entry
                .bundle()
                .map(|bundle| format!(" [{bundle}]"))
                .unwrap_or_default();
            println!(
                "    {} {}{}",
                Style::new().yellow().apply_to(&entry.id),
                Style::new().dim().apply_to(entry.location),
                owner
            );
        }
    }
}

fn print_bundles(bundles: Option<&BundleCatalog>, detailed: bool) {
    println!("{}", Style::new().bold().apply_to("Bundles:"));
    let Some(bundles) = bundles else {
        print_missing(Stage::Partition);
        return;
    };

    let local = bundles.with_location(BundleLocation::Local).count();
    let remote = bundles.with_location(BundleLocation::Remote).count();
    println!("  {local} local, {remote} remote");

    if detailed {
        for (name, info) in &bundles.bundles {
            let deps = if info.dependencies.is_empty() {
                String::new()
            } else {
                format!(" -> {}", info.dependencies.join(", "))
            };
            println!(
                "    {} {} {}{}",
                Style::new().yellow().apply_to(name),
                Style::new().cyan().apply_to(info.location),
                Style::new().dim().apply_to(format_size(info.size)),
                deps
            );
        }
    }
}

fn print_downloadables(downloadables: Option<&Downloadables>) {
    println!("{}", Style::new().bold().apply_to("Downloads:"));
    let Some(downloadables) = downloadables else {
        print_missing(Stage::Partition);
        return;
    };
    println!(
        "  {} bundles, {} total",
        downloadables.bundles.len(),
        format_size(downloadables.total_size())
    );
}
