//! Customize stage
//!
//! Applies the project's customize rules to the design catalog. Rules run in
//! file order; a later rule overrides what an earlier one set.

use super::{Pipeline, Stage, StageReport};
use crate::catalog::Catalog;
use crate::config::CustomizeRule;
use crate::error::{Result, stage_input_missing};

pub(super) fn run(pipeline: &Pipeline) -> Result<StageReport> {
    let design_path = pipeline.project_dir().join(&pipeline.config().catalog);
    if !design_path.is_file() {
        return Err(stage_input_missing(
            Stage::Customize.as_str(),
            design_path.display().to_string(),
        ));
    }
    let design = Catalog::read_file(&design_path)?;
    let (customized, changed) = apply_rules(&design, &pipeline.config().customize)?;

    let output = pipeline.layout().customized_catalog();
    customized.write_file(&output)?;
    log::debug!("Customized catalog written to {}", output.display());

    Ok(StageReport::new(
        Stage::Customize,
        format!(
            "{} of {} entries customized by {} rules",
            changed,
            customized.len(),
            pipeline.config().customize.len()
        ),
    ))
}

/// Apply `rules` to every entry, returning the new catalog and how many
/// entries changed
pub fn apply_rules(design: &Catalog, rules: &[CustomizeRule]) -> Result<(Catalog, usize)> {
    let mut changed = 0;
    let entries: Vec<_> = design
        .entries()
        .map(|original| {
            let mut entry = original.clone();
            for rule in rules {
                if rule.matches(&entry) {
                    rule.apply(&mut entry);
                }
            }
            if entry != *original {
                changed += 1;
            }
            entry
        })
        .collect();
    let catalog = Catalog::from_entries(entries, design.local_bundle_names().iter().cloned())?;
    Ok((catalog, changed))
}

