//! Compile stage
//!
//! Compiles the customized catalog for the pipeline's platform and writes
//! the runtime catalog, the bundle assignment consumed by `build` and the
//! updated always-loaded scene list.

use std::collections::BTreeMap;
use std::path::Path;

use super::{BuildLayout, Pipeline, Stage, StageReport};
use crate::catalog::Catalog;
use crate::common::fs as common_fs;
use crate::compiler::{DirectoryKeyResolver, compile};
use crate::config::SceneList;
use crate::error::{Result, config_parse_failed};

/// Bundle name to the asset files packed into it
pub type BundleAssignment = BTreeMap<String, Vec<String>>;

pub(super) fn run(pipeline: &Pipeline) -> Result<StageReport> {
    let layout = pipeline.layout();
    let input = BuildLayout::require(Stage::Compile, layout.customized_catalog())?;
    let design = Catalog::read_file(&input)?;

    let asset_root = pipeline.project_dir().join(&pipeline.config().asset_root);
    let resolver = DirectoryKeyResolver::new(asset_root);
    let output = compile(&design, pipeline.platform(), &resolver)?;

    output.catalog.write_file(&layout.runtime_catalog())?;
    write_assignment(&layout.assignment(), &output.bundle_assignment)?;

    let scenes_path = layout.scenes();
    let mut scenes = SceneList::read_or_default(&scenes_path)?;
    if scenes.apply(&output.scene_list) {
        log::debug!("Scene list updated: {} scenes", scenes.scenes.len());
    }
    scenes.write(&scenes_path)?;

    let warnings: Vec<String> = output
        .anomalies
        .iter()
        .map(|anomaly| {
            log::warn!("{anomaly}");
            anomaly.to_string()
        })
        .collect();

    Ok(StageReport::new(
        Stage::Compile,
        format!(
            "{} entries compiled, {} bundles assigned",
            output.catalog.len(),
            output.bundle_assignment.len()
        ),
    )
    .with_warnings(warnings))
}

pub fn write_assignment(path: &Path, assignment: &BundleAssignment) -> Result<()> {
    let mut json = serde_json::to_string_pretty(assignment)?;
    json.push('\n');
    common_fs::write_atomic(path, json.as_bytes())
}

pub fn read_assignment(path: &Path) -> Result<BundleAssignment> {
    let content = common_fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string()))
}
