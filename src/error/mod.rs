//! Error types and handling for Addressable
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`catalog`]: Catalog parsing and resolution errors
//! - [`provider`]: Backing-store and scene errors
//! - [`cache`]: Bundle cache and session bookkeeping errors
//! - [`manifest`]: Manifest and partition errors
//! - [`config`]: Configuration and pipeline errors
//! - [`fs`]: File system errors
//!
//! Every variant is `Clone`: a shared [`AsyncOp`](crate::operation::AsyncOp)
//! hands the same failure to each caller polling it.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod fs;
pub mod manifest;
pub mod provider;

pub use cache::{asset_not_loaded, bundle_not_in_manifest, bundle_not_loaded};
pub use catalog::{malformed as malformed_catalog, unknown_id};
pub use config::{
    invalid as config_invalid, not_found as config_not_found, parse_failed as config_parse_failed,
    stage_input_missing,
};
pub use fs::{
    io_error, not_found as file_not_found, read_failed as file_read_failed,
    write_failed as file_write_failed,
};
pub use manifest::{circular as circular_dependency, dependency_not_found};
pub use provider::{invalid_location, invalid_scene, provider_failure};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Addressable operations
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum AddressableError {
    // Catalog errors
    #[error("Unknown asset id '{id}'")]
    #[diagnostic(
        code(addressable::catalog::unknown_id),
        help("Check the id against the runtime catalog, or that the entry targets this platform")
    )]
    UnknownId { id: String },

    #[error("Malformed catalog: {reason}")]
    #[diagnostic(code(addressable::catalog::malformed))]
    MalformedCatalog { reason: String },

    // Provider errors
    #[error("Invalid location for '{id}': {reason}")]
    #[diagnostic(
        code(addressable::provider::invalid_location),
        help("Every entry needs a physical key, and bundle entries need a bundle name")
    )]
    InvalidLocation { id: String, reason: String },

    #[error("Provider failed to load '{id}': {reason}")]
    #[diagnostic(code(addressable::provider::failure))]
    ProviderFailure { id: String, reason: String },

    #[error("Invalid scene '{id}': {reason}")]
    #[diagnostic(code(addressable::provider::invalid_scene))]
    InvalidScene { id: String, reason: String },

    #[error("No provider registered for {location} entries")]
    #[diagnostic(
        code(addressable::provider::missing),
        help("Register the backing store on the SessionBuilder before loading")
    )]
    NoProvider { location: String },

    // Operation errors
    #[error("Operation for '{id}' was cancelled")]
    #[diagnostic(code(addressable::operation::cancelled))]
    OperationCancelled { id: String },

    #[error("Operation polled after its continuation was consumed")]
    #[diagnostic(code(addressable::operation::reused))]
    OperationReused,

    // Cache errors
    #[error("Bundle '{name}' is not part of the bundle catalog")]
    #[diagnostic(
        code(addressable::cache::not_in_manifest),
        help("Rebuild the bundle catalog with 'addressable partition'")
    )]
    BundleNotInManifest { name: String },

    #[error("Bundle '{name}' is not loaded")]
    #[diagnostic(
        code(addressable::cache::not_loaded),
        help("Every release must pair with exactly one earlier load")
    )]
    BundleNotLoaded { name: String },

    #[error("Asset '{id}' is not loaded")]
    #[diagnostic(code(addressable::session::not_loaded))]
    AssetNotLoaded { id: String },

    // Manifest and partition errors
    #[error(
        "Manifest mismatch: used but never produced [{}]; declared local but never produced [{}]",
        .used_not_in_manifest.join(", "),
        .declared_local_not_in_manifest.join(", ")
    )]
    #[diagnostic(
        code(addressable::manifest::mismatch),
        help("Every referenced or local bundle must be produced by the packaging step")
    )]
    ManifestMismatch {
        used_not_in_manifest: Vec<String>,
        declared_local_not_in_manifest: Vec<String>,
    },

    #[error("Bundles produced but never used: {}", .bundles.join(", "))]
    #[diagnostic(
        code(addressable::manifest::not_used),
        severity(Warning),
        help("Remove the bundles from the packaging input, or ban them in addressable.yaml")
    )]
    InManifestNotUsed { bundles: Vec<String> },

    #[error("Circular dependency detected: {chain}")]
    #[diagnostic(
        code(addressable::manifest::circular),
        help("Bundle dependencies must form a directed acyclic graph")
    )]
    CircularDependency { chain: String },

    #[error("Dependency '{dependency}' of bundle '{bundle}' was never produced")]
    #[diagnostic(code(addressable::manifest::dependency_not_found))]
    DependencyNotFound { bundle: String, dependency: String },

    // Build errors
    #[error("Catalog compilation failed: {message}")]
    #[diagnostic(code(addressable::compile::failed))]
    CompileFailed { message: String },

    #[error("Packaging failed: {message}")]
    #[diagnostic(code(addressable::build::packaging_failed))]
    PackagingFailed { message: String },

    #[error("Stage '{stage}' needs {path}")]
    #[diagnostic(
        code(addressable::pipeline::input_missing),
        help("Run the earlier pipeline stages first, or 'addressable all'")
    )]
    StageInputMissing { stage: String, path: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(addressable::config::not_found),
        help("Create addressable.yaml in the project directory or pass --project")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(addressable::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(addressable::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(addressable::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(addressable::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(addressable::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(addressable::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for AddressableError {
    fn from(err: std::io::Error) -> Self {
        AddressableError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for AddressableError {
    fn from(err: serde_yaml::Error) -> Self {
        AddressableError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AddressableError {
    fn from(err: serde_json::Error) -> Self {
        AddressableError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, AddressableError>;
