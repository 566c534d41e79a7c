//! Bundle cache and session errors

use super::AddressableError;

/// Creates a bundle not in manifest error
pub fn bundle_not_in_manifest(name: impl Into<String>) -> AddressableError {
    AddressableError::BundleNotInManifest { name: name.into() }
}

/// Creates a bundle not loaded error
pub fn bundle_not_loaded(name: impl Into<String>) -> AddressableError {
    AddressableError::BundleNotLoaded { name: name.into() }
}

/// Creates an asset not loaded error
pub fn asset_not_loaded(id: impl Into<String>) -> AddressableError {
    AddressableError::AssetNotLoaded { id: id.into() }
}
