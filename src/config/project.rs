//! Project configuration (addressable.yaml)
//!
//! Lives at the project root and drives the build pipeline:
//!
//! ```yaml
//! catalog: design/catalog.yaml
//! asset_root: assets
//! platform: android
//! local_bundles: [core]
//! banned: [editor_tools]
//! customize:
//!   - pattern: "Chars/**"
//!     bundle: chars
//!     group: characters
//! packager:
//!   command: [packtool, "--platform", "{platform}", "--in", "{input}", "--out", "{output}"]
//!   dependencies:
//!     chars: [shared]
//! build_dir: .addressable
//! dist_dir: dist
//! ```
//!
//! Every path is relative to the directory holding the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wax::{CandidatePath, Glob, Pattern};

use crate::common::fs as common_fs;
use crate::domain::{CatalogEntry, LocationType, Platform, PlatformMask};
use crate::error::{Result, config_invalid, config_not_found, config_parse_failed};

pub const PROJECT_FILE: &str = "addressable.yaml";

fn default_catalog() -> PathBuf {
    PathBuf::from("catalog.yaml")
}

fn default_asset_root() -> PathBuf {
    PathBuf::from("assets")
}

fn default_build_dir() -> PathBuf {
    PathBuf::from(".addressable")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

/// Project configuration structure (addressable.yaml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Design catalog (YAML)
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,

    /// Root the physical keys of entries resolve against
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,

    /// Platform used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,

    /// Bundles shipped with the client in addition to the catalog's own
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_bundles: Vec<String>,

    /// Produced bundles that are unused on purpose
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub banned: Vec<String>,

    /// Rules applied to the design catalog by the customize stage, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customize: Vec<CustomizeRule>,

    #[serde(default)]
    pub packager: PackagerConfig,

    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            asset_root: default_asset_root(),
            platform: None,
            local_bundles: Vec::new(),
            banned: Vec::new(),
            customize: Vec::new(),
            packager: PackagerConfig::default(),
            build_dir: default_build_dir(),
            dist_dir: default_dist_dir(),
        }
    }
}

/// How bundles get packaged
///
/// Without a command the built-in packager archives each bundle's assets and
/// takes bundle dependencies from `dependencies`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagerConfig {
    /// External packaging tool and its arguments
    ///
    /// `{platform}`, `{input}` and `{output}` are substituted. The tool must
    /// write `manifest.json` into `{output}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,

    /// Direct bundle dependencies for the built-in packager
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, Vec<String>>,
}

/// One customize rule: selectors and the edits applied to matching entries
///
/// An entry matches when every given selector matches. Edits overwrite the
/// entry's fields; setting `bundle` also makes the entry a bundle entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomizeRule {
    /// Glob over the entry's physical key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Required design label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<PlatformMask>,
}

impl CustomizeRule {
    /// Check whether the rule selects `entry`
    ///
    /// Keys are matched with forward slashes on every platform.
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        if let Some(label) = &self.label {
            if !entry.labels.iter().any(|l| l == label) {
                return false;
            }
        }
        match &self.pattern {
            Some(pattern) => {
                let key = common_fs::to_forward_slashes(Path::new(&entry.key));
                Glob::new(pattern)
                    .map(|glob| glob.matched(&CandidatePath::from(key.as_str())).is_some())
                    .unwrap_or(false)
            }
            None => true,
        }
    }

    /// Apply the rule's edits to `entry`
    pub fn apply(&self, entry: &mut CatalogEntry) {
        if let Some(group) = &self.group {
            entry.group.clone_from(group);
        }
        if let Some(location) = self.location {
            entry.location = location;
            if location != LocationType::Bundle {
                entry.bundle_name = None;
            }
        }
        if let Some(bundle) = &self.bundle {
            entry.location = LocationType::Bundle;
            entry.bundle_name = Some(bundle.clone());
        }
        if let Some(platforms) = self.platforms {
            entry.platforms = platforms;
        }
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.pattern.is_none() && self.label.is_none() {
            return Err(config_invalid(format!(
                "customize rule {index} needs a pattern or a label"
            )));
        }
        if self.group.is_none()
            && self.bundle.is_none()
            && self.location.is_none()
            && self.platforms.is_none()
        {
            return Err(config_invalid(format!("customize rule {index} changes nothing")));
        }
        if let Some(pattern) = &self.pattern {
            Glob::new(pattern).map_err(|e| {
                config_invalid(format!("customize rule {index}: invalid pattern '{pattern}': {e}"))
            })?;
        }
        if self.bundle.is_some() && self.location.is_some_and(|l| l != LocationType::Bundle) {
            return Err(config_invalid(format!(
                "customize rule {index} sets a bundle on a non-bundle location"
            )));
        }
        Ok(())
    }
}

impl ProjectConfig {
    /// Parse project configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| config_parse_failed(PROJECT_FILE, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load `addressable.yaml` from a project directory
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(PROJECT_FILE);
        if !path.is_file() {
            return Err(config_not_found(path.display().to_string()));
        }
        let content = common_fs::read_to_string(&path)?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (index, rule) in self.customize.iter().enumerate() {
            rule.validate(index + 1)?;
        }
        if let Some(bundle) = self.local_bundles.iter().find(|b| self.banned.contains(b)) {
            return Err(config_invalid(format!(
                "bundle '{bundle}' is both local and banned"
            )));
        }
        if let Some(command) = &self.packager.command {
            if command.is_empty() {
                return Err(config_invalid("packager command is empty"));
            }
        }
        Ok(())
    }

    /// The platform to build: the explicit one, else the configured default
    pub fn resolve_platform(&self, explicit: Option<Platform>) -> Result<Platform> {
        explicit.or(self.platform).ok_or_else(|| {
            config_invalid(format!(
                "no platform given; pass --platform or set 'platform' in {PROJECT_FILE}"
            ))
        })
    }
}
