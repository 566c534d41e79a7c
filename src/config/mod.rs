//! Configuration and artifact file handling
//!
//! This module contains data structures for:
//! - `addressable.yaml` - Project configuration
//! - `manifest.json` - Bundles produced by the packaging step
//! - `bundle_catalog.json` - Shipped bundles with location, hash and size
//! - `downloadables.json` - Remote bundles for the downloader
//! - `scenes.json` - Always-loaded scene list

pub mod bundle_catalog;
pub mod downloadables;
pub mod manifest;
pub mod project;
pub mod scenes;

pub use bundle_catalog::{BundleCatalog, BundleInfo, BundleLocation};
pub use downloadables::{Downloadable, Downloadables};
pub use manifest::{Manifest, ManifestBundle};
pub use project::{CustomizeRule, PackagerConfig, ProjectConfig};
pub use scenes::{SceneList, SceneListDelta};
