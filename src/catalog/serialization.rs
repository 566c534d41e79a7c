//! On-disk form of a catalog
//!
//! Entries are stored as a list sorted by id so that catalog files diff
//! cleanly between builds. Local bundles and groups are stored sorted too.

use serde::{Deserialize, Serialize};

use crate::domain::{CatalogEntry, Platform};

/// Current catalog format version
pub const CATALOG_FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    CATALOG_FORMAT_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct CatalogFile {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,

    #[serde(default)]
    pub local_bundles: Vec<String>,

    #[serde(default)]
    pub groups: Vec<String>,

    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
}
