//! Partition stage
//!
//! Splits the bundles the build produced into the ones shipped with the
//! client and the ones downloaded on demand, then writes the shipped bundle
//! catalog and the download list.

use super::{BuildLayout, Pipeline, Stage, StageReport};
use crate::catalog::Catalog;
use crate::config::{BundleCatalog, Downloadables, Manifest};
use crate::error::Result;
use crate::resolver::Partitioner;

pub(super) fn run(pipeline: &Pipeline) -> Result<StageReport> {
    let layout = pipeline.layout();
    let catalog = Catalog::read_file(&BuildLayout::require(
        Stage::Partition,
        layout.runtime_catalog(),
    )?)?;
    let manifest = Manifest::read(&BuildLayout::require(Stage::Partition, layout.manifest())?)?;

    let graph = manifest.graph();
    graph.validate()?;
    let config = pipeline.config();
    let result = Partitioner::new(&catalog, &graph)
        .explicit_local(&config.local_bundles)
        .banned(&config.banned)
        .run();
    let warnings = result.check()?;

    let bundle_catalog = BundleCatalog::from_partition(
        &manifest,
        &result,
        &layout.bundles_dir(),
        pipeline.platform(),
    )?;
    bundle_catalog.write(&layout.bundle_catalog())?;
    let downloadables = Downloadables::from_bundle_catalog(&bundle_catalog);
    downloadables.write(&layout.downloadables())?;

    Ok(StageReport::new(
        Stage::Partition,
        format!(
            "{} local, {} remote ({} bytes to download)",
            result.local.len(),
            result.remote.len(),
            downloadables.total_size()
        ),
    )
    .with_warnings(warnings.iter().map(ToString::to_string).collect()))
}
