//! File system errors

use std::path::Path;

use super::AddressableError;

/// Creates a file not found error
pub fn not_found(path: impl AsRef<Path>) -> AddressableError {
    AddressableError::FileNotFound {
        path: path.as_ref().display().to_string(),
    }
}

/// Creates a file read failed error
pub fn read_failed(path: impl AsRef<Path>, reason: impl ToString) -> AddressableError {
    AddressableError::FileReadFailed {
        path: path.as_ref().display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a file write failed error
pub fn write_failed(path: impl AsRef<Path>, reason: impl ToString) -> AddressableError {
    AddressableError::FileWriteFailed {
        path: path.as_ref().display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> AddressableError {
    AddressableError::IoError {
        message: message.into(),
    }
}
