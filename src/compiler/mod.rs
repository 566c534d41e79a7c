//! Offline catalog compiler
//!
//! Turns the design catalog into the runtime catalog for one platform.
//! Compilation checks every physical key, records which asset files go into
//! which bundle and which scenes must (or must not) be always loaded. The
//! design catalog is left untouched.
//!
//! Problems that do not stop a build are returned as [`Anomaly`] values and
//! left for the caller to report; the compiler never fixes them.

pub mod resolve;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub use resolve::{DirectoryKeyResolver, KeyResolver};

use crate::catalog::Catalog;
use crate::config::SceneListDelta;
use crate::domain::{CatalogEntry, LocationType, Platform};
use crate::error::{AddressableError, Result};

/// A design mistake the compiler reports without failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// A bundle declared local that no entry on this platform uses
    BundleDeclaredUnused { bundle: String },
    /// A bundle entry that names no bundle; it cannot be loaded
    EntryWithoutBundle { id: String },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::BundleDeclaredUnused { bundle } => {
                write!(f, "bundle '{bundle}' is declared local but no entry uses it")
            }
            Anomaly::EntryWithoutBundle { id } => {
                write!(f, "bundle entry '{id}' names no bundle")
            }
        }
    }
}

/// Everything one compilation produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    /// Runtime catalog: platform entries only, labels stripped
    pub catalog: Catalog,
    /// Bundle name to the asset files packed into it
    pub bundle_assignment: BTreeMap<String, Vec<String>>,
    /// Changes to the always-loaded scene list
    pub scene_list: SceneListDelta,
    pub anomalies: Vec<Anomaly>,
}

/// Compile `design` for `platform`
///
/// # Errors
///
/// `CompileFailed` naming every entry whose key does not resolve, or
/// `MalformedCatalog` if the filtered entries do not form a valid catalog.
pub fn compile(
    design: &Catalog,
    platform: Platform,
    resolver: &dyn KeyResolver,
) -> Result<CompileOutput> {
    let targeted = design.filter_by_platform(platform);

    let mut unresolved = Vec::new();
    let mut entries = Vec::with_capacity(targeted.len());
    let mut bundle_assignment: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut scene_list = SceneListDelta::default();
    let mut anomalies = Vec::new();

    for entry in targeted.entries() {
        let Some(path) = resolver.resolve(&entry.key, platform) else {
            unresolved.push(format!("'{}' (key '{}')", entry.id, entry.key));
            continue;
        };

        if entry.location == LocationType::Bundle {
            match entry.bundle() {
                Some(bundle) => bundle_assignment
                    .entry(bundle.to_string())
                    .or_default()
                    .push(path),
                None => anomalies.push(Anomaly::EntryWithoutBundle {
                    id: entry.id.clone(),
                }),
            }
        }

        if entry.is_scene() {
            match entry.location {
                LocationType::PackagedResource => {
                    scene_list.add.insert(entry.key.clone());
                }
                LocationType::Bundle => {
                    scene_list.remove.insert(entry.key.clone());
                }
                LocationType::DirectAsset => {}
            }
        }

        entries.push(runtime_entry(entry));
    }

    if !unresolved.is_empty() {
        return Err(AddressableError::CompileFailed {
            message: format!(
                "{} entries have unresolved keys on {platform}: {}",
                unresolved.len(),
                unresolved.join(", ")
            ),
        });
    }

    let used: BTreeSet<&str> = targeted.entries().filter_map(CatalogEntry::bundle).collect();
    anomalies.extend(
        design
            .local_bundle_names()
            .iter()
            .filter(|bundle| !used.contains(bundle.as_str()))
            .map(|bundle| Anomaly::BundleDeclaredUnused {
                bundle: bundle.clone(),
            }),
    );
    for paths in bundle_assignment.values_mut() {
        paths.sort();
        paths.dedup();
    }

    let catalog = Catalog::from_entries(entries, design.local_bundle_names().iter().cloned())?
        .with_platform(platform);
    log::debug!(
        "Compiled {} entries for {platform} into {} bundles",
        catalog.len(),
        bundle_assignment.len()
    );
    Ok(CompileOutput {
        catalog,
        bundle_assignment,
        scene_list,
        anomalies,
    })
}

/// Labels are design-time only; a missing asset name defaults to the key's file name
fn runtime_entry(entry: &CatalogEntry) -> CatalogEntry {
    let mut compiled = CatalogEntry {
        labels: Vec::new(),
        ..entry.clone()
    };
    if compiled.asset_name.is_empty() {
        let key = compiled.key.trim();
        compiled.asset_name = key.rsplit('/').next().unwrap_or(key).to_string();
    }
    compiled
}
