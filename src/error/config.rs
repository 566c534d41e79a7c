//! Configuration and pipeline errors

use super::AddressableError;

/// Creates a config not found error
pub fn not_found(path: impl Into<String>) -> AddressableError {
    AddressableError::ConfigNotFound { path: path.into() }
}

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> AddressableError {
    AddressableError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> AddressableError {
    AddressableError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates a missing stage input error
pub fn stage_input_missing(stage: impl Into<String>, path: impl Into<String>) -> AddressableError {
    AddressableError::StageInputMissing {
        stage: stage.into(),
        path: path.into(),
    }
}
