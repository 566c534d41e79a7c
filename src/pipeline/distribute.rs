//! Distribute stage
//!
//! Copies the client package (runtime catalog, bundle catalog, scene list
//! and local bundles) and the upload set (remote bundles and the download
//! list) into the dist directory. Bundle files are checked against the
//! hashes recorded at partition time. The copy is transactional: on any
//! failure the previous distribution is restored.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{BuildLayout, Pipeline, Stage, StageReport};
use crate::common::fs as common_fs;
use crate::config::{BundleCatalog, BundleLocation};
use crate::error::{AddressableError, Result};
use crate::hash;
use crate::progress::ProgressDisplay;
use crate::transaction::Transaction;

/// One file to place in the dist directory
#[derive(Debug, Clone, PartialEq, Eq)]
struct Placement {
    source: PathBuf,
    target: PathBuf,
    /// Recorded content hash, for bundle files
    hash: Option<String>,
}

pub(super) fn run(pipeline: &Pipeline) -> Result<StageReport> {
    let layout = pipeline.layout();
    let bundle_catalog_path = BuildLayout::require(Stage::Distribute, layout.bundle_catalog())?;
    let bundle_catalog = BundleCatalog::read(&bundle_catalog_path)?;

    let plan = plan(layout, &bundle_catalog, bundle_catalog_path)?;
    let progress = ProgressDisplay::new(plan.len() as u64);
    let mut transaction = Transaction::new();
    match apply(layout, &plan, &mut transaction, &progress) {
        Ok(removed) => {
            transaction.commit();
            progress.finish();
            let local = bundle_catalog.with_location(BundleLocation::Local).count();
            let remote = bundle_catalog.with_location(BundleLocation::Remote).count();
            let stale = if removed > 0 {
                format!(", {removed} stale files removed")
            } else {
                String::new()
            };
            let summary = format!(
                "{local} local bundles packaged, {remote} remote bundles ready for upload{stale}"
            );
            Ok(StageReport::new(Stage::Distribute, summary))
        }
        Err(err) => {
            progress.abandon();
            Err(err)
        }
    }
}

fn plan(
    layout: &BuildLayout,
    bundle_catalog: &BundleCatalog,
    bundle_catalog_path: PathBuf,
) -> Result<Vec<Placement>> {
    let package = layout.package_dir();
    let upload = layout.upload_dir();
    let copy = |source: PathBuf, dir: &Path| Placement {
        target: dir.join(source.file_name().unwrap_or_default()),
        source,
        hash: None,
    };

    let mut plan = vec![
        copy(
            BuildLayout::require(Stage::Distribute, layout.runtime_catalog())?,
            &package,
        ),
        copy(bundle_catalog_path, &package),
        copy(
            BuildLayout::require(Stage::Distribute, layout.downloadables())?,
            &upload,
        ),
    ];
    if layout.scenes().is_file() {
        plan.push(copy(layout.scenes(), &package));
    }

    let bundles_dir = layout.bundles_dir();
    for info in bundle_catalog.bundles.values() {
        let dir = match info.location {
            BundleLocation::Local => &package,
            BundleLocation::Remote => &upload,
        };
        plan.push(Placement {
            source: bundles_dir.join(&info.file),
            target: dir.join(&info.file),
            hash: Some(info.hash.clone()),
        });
    }
    Ok(plan)
}

/// Copy every planned file and remove stale ones; returns how many were
/// removed
fn apply(
    layout: &BuildLayout,
    plan: &[Placement],
    transaction: &mut Transaction,
    progress: &ProgressDisplay,
) -> Result<usize> {
    transaction.create_dir_all(&layout.package_dir())?;
    transaction.create_dir_all(&layout.upload_dir())?;

    for placement in plan {
        if let Some(expected) = &placement.hash {
            let actual = hash::hash_file(&placement.source)?;
            if !hash::verify_hash(expected, &actual) {
                return Err(AddressableError::PackagingFailed {
                    message: format!(
                        "{} changed since partition; rerun 'addressable partition'",
                        placement.source.display()
                    ),
                });
            }
        }
        transaction.backup_file(&placement.target)?;
        common_fs::copy_file(&placement.source, &placement.target)?;
        progress.update_file(&common_fs::to_forward_slashes(&placement.target));
    }

    let planned: BTreeSet<&Path> = plan.iter().map(|p| p.target.as_path()).collect();
    let stale: Vec<PathBuf> = [layout.package_dir(), layout.upload_dir()]
        .iter()
        .flat_map(|dir| WalkDir::new(dir).into_iter().filter_map(std::result::Result::ok))
        .filter(|e| e.file_type().is_file() && !planned.contains(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    for path in &stale {
        log::debug!("Removing stale {}", path.display());
        transaction.backup_file(path)?;
        fs::remove_file(path)?;
    }
    Ok(stale.len())
}
