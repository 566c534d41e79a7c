//! Catalog errors

use super::AddressableError;

/// Creates an unknown id error
pub fn unknown_id(id: impl Into<String>) -> AddressableError {
    AddressableError::UnknownId { id: id.into() }
}

/// Creates a malformed catalog error
pub fn malformed(reason: impl Into<String>) -> AddressableError {
    AddressableError::MalformedCatalog {
        reason: reason.into(),
    }
}
