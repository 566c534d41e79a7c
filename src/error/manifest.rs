//! Manifest and dependency errors

use super::AddressableError;

/// Creates a circular dependency error
pub fn circular(chain: impl Into<String>) -> AddressableError {
    AddressableError::CircularDependency {
        chain: chain.into(),
    }
}

/// Creates a dependency not found error
pub fn dependency_not_found(
    bundle: impl Into<String>,
    dependency: impl Into<String>,
) -> AddressableError {
    AddressableError::DependencyNotFound {
        bundle: bundle.into(),
        dependency: dependency.into(),
    }
}
