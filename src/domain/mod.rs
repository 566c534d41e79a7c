//! Domain models for Addressable
//!
//! This module contains pure domain objects: catalog entries, their location
//! types, target platforms and the opaque resource handle produced by loads.

pub mod entry;
pub mod platform;
pub mod resource;

pub use entry::{AssetKind, CatalogEntry, LocationType};
pub use platform::{Platform, PlatformMask};
pub use resource::Resource;
