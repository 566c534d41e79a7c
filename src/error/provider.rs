//! Provider errors

use super::AddressableError;

/// Creates an invalid location error
pub fn invalid_location(id: impl Into<String>, reason: impl Into<String>) -> AddressableError {
    AddressableError::InvalidLocation {
        id: id.into(),
        reason: reason.into(),
    }
}

/// Creates a provider failure error
pub fn provider_failure(id: impl Into<String>, reason: impl Into<String>) -> AddressableError {
    AddressableError::ProviderFailure {
        id: id.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid scene error
pub fn invalid_scene(id: impl Into<String>, reason: impl Into<String>) -> AddressableError {
    AddressableError::InvalidScene {
        id: id.into(),
        reason: reason.into(),
    }
}
