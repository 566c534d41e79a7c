//! Shipped bundle catalog (bundle_catalog.json)
//!
//! The partition stage's output and the runtime's source of truth for bundle
//! dependencies. Only bundles classified local or remote appear in it. Each
//! records its direct dependencies, where it is loaded from, and the file's
//! BLAKE3 hash and size.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::manifest::Manifest;
use crate::common::fs as common_fs;
use crate::domain::Platform;
use crate::error::{Result, config_parse_failed};
use crate::hash;
use crate::resolver::{DependencyGraph, PartitionResult};

pub const BUNDLE_CATALOG_FILE: &str = "bundle_catalog.json";

/// Where a bundle is loaded from at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleLocation {
    /// Inside the client package
    Local,
    /// Fetched by the downloader on first use
    Remote,
}

impl fmt::Display for BundleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleLocation::Local => write!(f, "local"),
            BundleLocation::Remote => write!(f, "remote"),
        }
    }
}

/// One shipped bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleInfo {
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub location: BundleLocation,
    pub file: String,
    pub hash: String,
    pub size: u64,
}

/// Bundle catalog structure (bundle_catalog.json)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,

    #[serde(default)]
    pub bundles: BTreeMap<String, BundleInfo>,
}

impl BundleCatalog {
    /// Build the catalog from a partition, hashing each bundle file
    ///
    /// `bundles_dir` is where the packaging step wrote the files named by the
    /// manifest.
    pub fn from_partition(
        manifest: &Manifest,
        partition: &PartitionResult,
        bundles_dir: &Path,
        platform: Platform,
    ) -> Result<Self> {
        let mut bundles = BTreeMap::new();
        let classified = partition
            .local
            .iter()
            .map(|b| (b, BundleLocation::Local))
            .chain(partition.remote.iter().map(|b| (b, BundleLocation::Remote)));

        for (name, location) in classified {
            let Some(entry) = manifest.bundles.get(name) else {
                continue;
            };
            let file = manifest.file_for(name).unwrap_or(name).to_string();
            let digest = hash::digest_file(&bundles_dir.join(&file))?;
            bundles.insert(
                name.clone(),
                BundleInfo {
                    dependencies: entry.dependencies.clone(),
                    location,
                    file,
                    hash: digest.hash,
                    size: digest.size,
                },
            );
        }

        Ok(Self {
            platform: Some(platform),
            bundles,
        })
    }

    /// Parse bundle catalog from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| config_parse_failed(BUNDLE_CATALOG_FILE, e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = common_fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        common_fs::write_atomic(path, self.to_json()?.as_bytes())
    }

    pub fn get(&self, name: &str) -> Option<&BundleInfo> {
        self.bundles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bundles.contains_key(name)
    }

    /// Bundles with the given location, in name order
    pub fn with_location(&self, location: BundleLocation) -> impl Iterator<Item = (&str, &BundleInfo)> {
        self.bundles
            .iter()
            .filter(move |(_, info)| info.location == location)
            .map(|(name, info)| (name.as_str(), info))
    }

    /// Dependency graph over the shipped bundles
    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::new(
            self.bundles
                .iter()
                .map(|(name, info)| (name.clone(), info.dependencies.clone()))
                .collect(),
        )
    }
}
