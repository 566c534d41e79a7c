//! Packaging manifest (manifest.json)
//!
//! Written by the packaging step next to the bundles it produced. Its keys
//! are the complete set of produced bundles; each value lists the bundle's
//! direct dependencies and the file it was written to.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::fs as common_fs;
use crate::error::{Result, config_parse_failed};
use crate::resolver::DependencyGraph;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Manifest structure (manifest.json)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub bundles: BTreeMap<String, ManifestBundle>,
}

/// One produced bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestBundle {
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// File name relative to the bundles directory; defaults to the bundle name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| config_parse_failed(MANIFEST_FILE, e.to_string()))
    }

    /// Serialize manifest to JSON string (pretty-printed)
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

    pub fn insert(&mut self, name: impl Into<String>, dependencies: Vec<String>, file: impl Into<String>) {
        self.bundles.insert(
            name.into(),
            ManifestBundle {
                dependencies,
                file: file.into(),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bundles.contains_key(name)
    }

    /// File name a bundle was written to
    pub fn file_for<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        self.bundles.get(name).map(|b| {
            if b.file.is_empty() {
                name
            } else {
                b.file.as_str()
            }
        })
    }

    /// The dependency graph over every produced bundle
    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::new(
            self.bundles
                .iter()
                .map(|(name, b)| (name.clone(), b.dependencies.clone()))
                .collect(),
        )
    }
}
