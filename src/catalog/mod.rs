//! Logical-id to physical-resource catalog
//!
//! A [`Catalog`] maps every logical asset id to a [`CatalogEntry`] saying
//! where the asset lives. Catalogs come in two shapes:
//!
//! - the design catalog, YAML, edited by hand and carrying labels
//! - the runtime catalog, JSON, compiled per platform and shipped with the
//!   client
//!
//! Both share one serialized layout (see [`serialization`]). A loaded catalog
//! is immutable; filtering produces a new one.

pub mod serialization;


use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub use serialization::CATALOG_FORMAT_VERSION;
use serialization::CatalogFile;

use crate::common::fs as common_fs;
use crate::domain::{CatalogEntry, Platform};
use crate::error::{Result, malformed_catalog, unknown_id};

/// Immutable set of catalog entries keyed by logical id
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
    local_bundles: BTreeSet<String>,
    groups: BTreeSet<String>,
    platform: Option<Platform>,
}

impl Catalog {
    /// Build a catalog from entries, rejecting duplicate or malformed ones
    ///
    /// Groups are collected from the entries.
    pub fn from_entries(
        entries: impl IntoIterator<Item = CatalogEntry>,
        local_bundles: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let mut map = BTreeMap::new();
        for entry in entries {
            entry.validate()?;
            if map.contains_key(&entry.id) {
                return Err(malformed_catalog(format!("duplicate id '{}'", entry.id)));
            }
            map.insert(entry.id.clone(), entry);
        }

        let groups = map
            .values()
            .filter(|e| !e.group.is_empty())
            .map(|e| e.group.clone())
            .collect();

        Ok(Self {
            entries: map,
            local_bundles: local_bundles.into_iter().collect(),
            groups,
            platform: None,
        })
    }

    /// Stamp the platform this catalog was compiled for
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Parse the JSON runtime form
    pub fn load(serialized: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(serialized)
            .map_err(|e| malformed_catalog(format!("invalid catalog JSON: {e}")))?;
        Self::from_file(file)
    }

    /// Parse the YAML design form
    pub fn from_yaml(serialized: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(serialized)
            .map_err(|e| malformed_catalog(format!("invalid catalog YAML: {e}")))?;
        Self::from_file(file)
    }

    /// Read a catalog file, choosing the format by extension
    ///
    /// `.yaml` and `.yml` are parsed as YAML, anything else as JSON.
    pub fn read_file(path: &Path) -> Result<Self> {
        let content = common_fs::read_to_string(path)?;
        if is_yaml(path) {
            Self::from_yaml(&content)
        } else {
            Self::load(&content)
        }
    }

    /// Write the catalog atomically, choosing the format by extension
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let content = if is_yaml(path) {
            self.to_yaml()?
        } else {
            self.to_json()?
        };
        common_fs::write_atomic(path, content.as_bytes())
    }

    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(&self.to_file())?;
        json.push('\n');
        Ok(json)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_file())?)
    }

    fn from_file(file: CatalogFile) -> Result<Self> {
        if file.version > CATALOG_FORMAT_VERSION {
            return Err(malformed_catalog(format!(
                "unsupported catalog version {} (newest known is {CATALOG_FORMAT_VERSION})",
                file.version
            )));
        }
        let mut catalog = Self::from_entries(file.entries, file.local_bundles)?;
        // Declared groups may exist without entries yet.
        catalog.groups.extend(file.groups);
        catalog.platform = file.platform;
        Ok(catalog)
    }

    fn to_file(&self) -> CatalogFile {
        CatalogFile {
            version: CATALOG_FORMAT_VERSION,
            platform: self.platform,
            local_bundles: self.local_bundles.iter().cloned().collect(),
            groups: self.groups.iter().cloned().collect(),
            entries: self.entries.values().cloned().collect(),
        }
    }

    /// Look up an entry by logical id
    ///
    /// Unknown ids are an error; there is no fallback asset.
    pub fn resolve(&self, id: &str) -> Result<&CatalogEntry> {
        self.entries.get(id).ok_or_else(|| unknown_id(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// The subset of entries that target `platform`
    ///
    /// Groups are recomputed from the surviving entries. The declared local
    /// bundles are kept as they are: a bundle may be needed only as a
    /// dependency of other bundles.
    pub fn filter_by_platform(&self, platform: Platform) -> Catalog {
        let entries: BTreeMap<String, CatalogEntry> = self
            .entries
            .iter()
            .filter(|(_, e)| e.targets(platform))
            .map(|(id, e)| (id.clone(), e.clone()))
            .collect();

        let groups = entries
            .values()
            .filter(|e| !e.group.is_empty())
            .map(|e| e.group.clone())
            .collect();

        Catalog {
            entries,
            local_bundles: self.local_bundles.clone(),
            groups,
            platform: self.platform,
        }
    }

    /// Bundles the catalog explicitly wants shipped with the client
    pub fn local_bundle_names(&self) -> &BTreeSet<String> {
        &self.local_bundles
    }

    /// Bundles referenced by at least one bundle entry
    pub fn used_bundle_names(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .filter_map(CatalogEntry::bundle)
            .map(str::to_string)
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}
