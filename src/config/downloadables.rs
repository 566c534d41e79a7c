//! Remote bundle list (downloadables.json)
//!
//! Handed to the external downloader: enough to fetch each remote bundle
//! from the upload area and verify it after transfer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::bundle_catalog::{BundleCatalog, BundleLocation};
use crate::common::fs as common_fs;
use crate::domain::Platform;
use crate::error::{Result, config_parse_failed};

pub const DOWNLOADABLES_FILE: &str = "downloadables.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downloadable {
    pub name: String,
    pub file: String,
    pub hash: String,
    pub size: u64,
}

/// Downloadables structure (downloadables.json)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downloadables {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,

    #[serde(default)]
    pub bundles: Vec<Downloadable>,
}

impl Downloadables {
    /// Every remote bundle of the catalog, in name order
    pub fn from_bundle_catalog(catalog: &BundleCatalog) -> Self {
        let bundles = catalog
            .with_location(BundleLocation::Remote)
            .map(|(name, info)| Downloadable {
                name: name.to_string(),
                file: info.file.clone(),
                hash: info.hash.clone(),
                size: info.size,
            })
            .collect();
        Self {
            platform: catalog.platform,
            bundles,
        }
    }

    pub fn total_size(&self) -> u64 {
        self.bundles.iter().map(|b| b.size).sum()
    }

    pub fn find(&self, name: &str) -> Option<&Downloadable> {
        self.bundles.iter().find(|b| b.name == name)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = common_fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        common_fs::write_atomic(path, json.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::bundle_catalog::BundleInfo;

    fn info(location: BundleLocation, size: u64) -> BundleInfo {
        BundleInfo {
            dependencies: vec![],
            location,
            file: String::from("f"),
            hash: String::from("blake3:aa"),
            size,
        }
    }

    #[test]
    fn test_only_remote_bundles() {
        let mut catalog = BundleCatalog {
            platform: Some(Platform::Android),
            ..BundleCatalog::default()
        };
        catalog
            .bundles
            .insert("local".to_string(), info(BundleLocation::Local, 1));
        catalog
            .bundles
            .insert("r1".to_string(), info(BundleLocation::Remote, 10));
        catalog
            .bundles
            .insert("r2".to_string(), info(BundleLocation::Remote, 5));

        let downloadables = Downloadables::from_bundle_catalog(&catalog);
        assert_eq!(downloadables.bundles.len(), 2);
        assert_eq!(downloadables.total_size(), 15);
        assert!(downloadables.find("local").is_none());
        assert_eq!(downloadables.platform, Some(Platform::Android));
    }

    #[test]
    fn test_write_and_read() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(DOWNLOADABLES_FILE);
        let downloadables = Downloadables {
            platform: None,
            bundles: vec![Downloadable {
                name: "fx".to_string(),
                file: "fx.bundle".to_string(),
                hash: "blake3:01".to_string(),
                size: 2,
            }],
        };
        downloadables.write(&path).unwrap();
        assert_eq!(Downloadables::read(&path).unwrap(), downloadables);
    }
}
