//! Catalog entry domain types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::platform::{Platform, PlatformMask};
use crate::error::{Result, malformed_catalog};

/// Physical storage an entry resolves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    /// Loaded straight from the editor asset database by physical key
    DirectAsset,
    /// Compiled into the player's flat, always-available resource store
    PackagedResource,
    /// Packed into a bundle that may depend on other bundles
    Bundle,
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationType::DirectAsset => write!(f, "direct_asset"),
            LocationType::PackagedResource => write!(f, "packaged_resource"),
            LocationType::Bundle => write!(f, "bundle"),
        }
    }
}

/// Whether an entry is a plain asset or a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    #[default]
    Asset,
    Scene,
}

impl AssetKind {
    fn is_asset(&self) -> bool {
        *self == AssetKind::Asset
    }
}

/// One catalog row: a logical id and where to find it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Logical id, unique within a catalog
    pub id: String,

    /// Physical key (editor guid, resource path or in-bundle path)
    #[serde(alias = "guid")]
    pub key: String,

    pub location: LocationType,

    /// Name of the object inside its storage
    #[serde(default)]
    pub asset_name: String,

    /// Owning bundle; only meaningful for bundle entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_name: Option<String>,

    #[serde(default)]
    pub platforms: PlatformMask,

    #[serde(default)]
    pub group: String,

    #[serde(default, skip_serializing_if = "AssetKind::is_asset")]
    pub kind: AssetKind,

    /// Design-time labels, stripped from compiled catalogs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl CatalogEntry {
    fn with_location(id: &str, key: &str, location: LocationType) -> Self {
        let asset_name = key.rsplit('/').next().unwrap_or(key).to_string();
        Self {
            id: id.to_string(),
            key: key.to_string(),
            location,
            asset_name,
            bundle_name: None,
            platforms: PlatformMask::all(),
            group: String::new(),
            kind: AssetKind::Asset,
            labels: Vec::new(),
        }
    }

    /// Entry loaded through the editor asset database
    pub fn direct(id: &str, key: &str) -> Self {
        Self::with_location(id, key, LocationType::DirectAsset)
    }

    /// Entry compiled into the packaged resource store
    pub fn packaged(id: &str, key: &str) -> Self {
        Self::with_location(id, key, LocationType::PackagedResource)
    }

    /// Entry shipped inside `bundle`
    pub fn bundled(id: &str, key: &str, bundle: &str) -> Self {
        let mut entry = Self::with_location(id, key, LocationType::Bundle);
        entry.bundle_name = Some(bundle.to_string());
        entry
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }

    pub fn with_platforms(mut self, platforms: PlatformMask) -> Self {
        self.platforms = platforms;
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| (*l).to_string()).collect();
        self
    }

    pub fn as_scene(mut self) -> Self {
        self.kind = AssetKind::Scene;
        self
    }

    pub fn is_scene(&self) -> bool {
        self.kind == AssetKind::Scene
    }

    /// The owning bundle, if this is a bundle entry that names one
    pub fn bundle(&self) -> Option<&str> {
        if self.location != LocationType::Bundle {
            return None;
        }
        self.bundle_name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn targets(&self, platform: Platform) -> bool {
        self.platforms.targets(platform)
    }

    /// Structural checks applied when a catalog is loaded
    ///
    /// A bundle entry without a bundle name is accepted here: it is reported
    /// by the compiler and refused by the provider, never dropped.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(malformed_catalog(format!(
                "entry with key '{}' has an empty id",
                self.key
            )));
        }
        if self.location != LocationType::Bundle && self.bundle_name.is_some() {
            return Err(malformed_catalog(format!(
                "entry '{}' names a bundle but its location is {}",
                self.id, self.location
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let entry = CatalogEntry::bundled("hero", "Assets/Chars/hero.prefab", "chars");
        assert_eq!(entry.location, LocationType::Bundle);
        assert_eq!(entry.asset_name, "hero.prefab");
        assert_eq!(entry.bundle(), Some("chars"));

        let entry = CatalogEntry::packaged("logo", "UI/logo");
        assert_eq!(entry.bundle(), None);
        assert!(!entry.is_scene());
    }

    #[test]
    fn test_bundle_ignored_for_non_bundle_entries() {
        let mut entry = CatalogEntry::direct("a", "guid-a");
        entry.bundle_name = Some("stray".to_string());
        assert_eq!(entry.bundle(), None);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_empty_bundle_name_is_no_bundle() {
        let entry = CatalogEntry::bundled("a", "k", "");
        assert_eq!(entry.bundle(), None);
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_empty_id_rejected() {
        let entry = CatalogEntry::direct(" ", "guid");
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_guid_alias_and_defaults() {
        let json = r#"{"id":"a","guid":"123","location":"packaged_resource"}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.key, "123");
        assert_eq!(entry.platforms, PlatformMask::all());
        assert_eq!(entry.kind, AssetKind::Asset);
        assert!(entry.group.is_empty());
    }

    #[test]
    fn test_location_display() {
        assert_eq!(LocationType::DirectAsset.to_string(), "direct_asset");
        assert_eq!(LocationType::Bundle.to_string(), "bundle");
    }
}
