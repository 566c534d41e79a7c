//! Engine-side collaborators
//!
//! The loading core never touches engine objects directly. Each backing
//! store is reached through one of these traits, registered on the
//! [`SessionBuilder`](crate::session::SessionBuilder). All methods take
//! `&self`: implementations live on the same cooperative thread and use
//! interior mutability if they need state.

use std::path::{Path, PathBuf};

use crate::config::BundleInfo;
use crate::domain::Resource;
use crate::operation::AsyncOp;

/// Editor asset database, addressed by physical key
pub trait AssetDatabase {
    /// Load an asset synchronously; `None` if the key resolves to nothing
    fn load_by_key(&self, key: &str) -> Option<Resource>;
}

/// Flat resource store compiled into the player package
pub trait ResourceStore {
    /// Load a resource synchronously; `None` if the path is absent
    fn load(&self, path: &str) -> Option<Resource>;

    /// Begin loading a resource; settles with `None` if the path is absent
    fn load_async(&self, path: &str) -> AsyncOp<Option<Resource>>;
}

/// Engine bundle loader
pub trait BundleStore {
    /// Begin loading the bundle file at `path`
    fn load_bundle(&self, name: &str, path: &Path) -> AsyncOp<Resource>;

    /// Release a bundle object produced by `load_bundle`
    fn unload_bundle(&self, name: &str, bundle: &Resource);

    /// Begin loading an asset from an already loaded bundle
    fn load_asset(&self, bundle: &Resource, asset_name: &str) -> AsyncOp<Resource>;
}

/// Fetches remote bundles; transport and verification are its business
pub trait Downloader {
    /// Begin fetching a remote bundle; settles with the local file path
    fn fetch(&self, name: &str, info: &BundleInfo) -> AsyncOp<PathBuf>;
}

/// How a scene load treats scenes already open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadSceneMode {
    /// Close every open scene first
    #[default]
    Single,
    /// Open alongside the current scenes
    Additive,
}

/// Engine scene manager; scenes are addressed by name
pub trait SceneManager {
    /// Load a scene synchronously; returns whether it opened
    fn load_scene(&self, scene: &str, mode: LoadSceneMode) -> bool;

    fn load_scene_async(&self, scene: &str, mode: LoadSceneMode) -> AsyncOp<()>;

    fn unload_scene_async(&self, scene: &str) -> AsyncOp<()>;
}
