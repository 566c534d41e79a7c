//! Backing-store providers
//!
//! A provider turns a [`CatalogEntry`] into a loaded [`Resource`] for one
//! [`LocationType`]. The set of stores is fixed, so providers form a closed
//! enum, [`AnyProvider`], dispatching to:
//!
//! - [`DirectAssetProvider`]: the editor asset database, synchronous only
//! - [`PackagedResourceProvider`]: the player's flat resource store
//! - [`BundleProvider`]: assets inside bundles, through the [`BundleCache`]
//!
//! Failures never panic. They come back through the operation's error
//! channel (or the `Result` of the synchronous calls):
//!
//! - `InvalidLocation`: no physical key, or a bundle entry naming no bundle
//! - `ProviderFailure`: the backing store could not produce the object
//! - `InvalidScene`: a non-scene entry passed to a scene call, or the scene
//!   manager refused the scene

pub mod bundle;
pub mod direct;
pub mod packaged;

#[cfg(test)]
mod tests;

use std::rc::Rc;

pub use bundle::BundleProvider;
pub use direct::DirectAssetProvider;
pub use packaged::PackagedResourceProvider;

use crate::cache::BundleCache;
use crate::domain::{CatalogEntry, LocationType, Resource};
use crate::error::{Result, invalid_location, invalid_scene};
use crate::operation::AsyncOp;
use crate::store::{LoadSceneMode, SceneManager};

/// Shared state a provider call may use
pub struct ProviderContext<'a> {
    /// Present when a bundle store is registered
    pub cache: Option<&'a mut BundleCache>,
    pub scenes: Option<&'a Rc<dyn SceneManager>>,
}

/// The load/unload contract every backing store satisfies
pub trait Provider {
    /// The entries this provider serves
    fn location(&self) -> LocationType;

    /// Load an asset synchronously
    fn load_asset(&self, ctx: &mut ProviderContext<'_>, entry: &CatalogEntry) -> Result<Resource>;

    fn load_asset_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> AsyncOp<Resource>;

    /// Open a scene synchronously; returns whether it opened
    fn load_scene(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
        mode: LoadSceneMode,
    ) -> bool;

    fn load_scene_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
        mode: LoadSceneMode,
    ) -> AsyncOp<()>;

    fn unload_scene_async(&self, ctx: &mut ProviderContext<'_>, entry: &CatalogEntry)
    -> AsyncOp<()>;

    /// Make everything the entry needs available before its content
    fn load_dependencies_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> AsyncOp<()>;

    /// Give back what one `load_dependencies_async` (or asset load) took
    fn unload_dependencies(&self, ctx: &mut ProviderContext<'_>, entry: &CatalogEntry)
    -> Result<()>;
}

/// Closed set of providers, one per location type
pub enum AnyProvider {
    Direct(DirectAssetProvider),
    Packaged(PackagedResourceProvider),
    Bundle(BundleProvider),
}

macro_rules! dispatch {
    ($self:ident, $provider:ident => $call:expr) => {
        match $self {
            AnyProvider::Direct($provider) => $call,
            AnyProvider::Packaged($provider) => $call,
            AnyProvider::Bundle($provider) => $call,
        }
    };
}

impl Provider for AnyProvider {
    fn location(&self) -> LocationType {
        dispatch!(self, p => p.location())
    }

    fn load_asset(&self, ctx: &mut ProviderContext<'_>, entry: &CatalogEntry) -> Result<Resource> {
        dispatch!(self, p => p.load_asset(ctx, entry))
    }

    fn load_asset_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> AsyncOp<Resource> {
        dispatch!(self, p => p.load_asset_async(ctx, entry))
    }

    fn load_scene(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
        mode: LoadSceneMode,
    ) -> bool {
        dispatch!(self, p => p.load_scene(ctx, entry, mode))
    }

    fn load_scene_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
        mode: LoadSceneMode,
    ) -> AsyncOp<()> {
        dispatch!(self, p => p.load_scene_async(ctx, entry, mode))
    }

    fn unload_scene_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> AsyncOp<()> {
        dispatch!(self, p => p.unload_scene_async(ctx, entry))
    }

    fn load_dependencies_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> AsyncOp<()> {
        dispatch!(self, p => p.load_dependencies_async(ctx, entry))
    }

    fn unload_dependencies(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> Result<()> {
        dispatch!(self, p => p.unload_dependencies(ctx, entry))
    }
}

/// The entry's physical key, or `InvalidLocation` if it has none
pub(crate) fn physical_key(entry: &CatalogEntry) -> Result<&str> {
    let key = entry.key.trim();
    if key.is_empty() {
        return Err(invalid_location(&entry.id, "missing physical key"));
    }
    Ok(key)
}

/// Checks shared by every scene call: a scene entry and a scene manager
pub(crate) fn scene_target(
    ctx: &ProviderContext<'_>,
    entry: &CatalogEntry,
) -> Result<Rc<dyn SceneManager>> {
    if !entry.is_scene() {
        return Err(invalid_scene(&entry.id, "entry is not a scene"));
    }
    physical_key(entry)?;
    ctx.scenes
        .map(Rc::clone)
        .ok_or_else(|| invalid_scene(&entry.id, "no scene manager registered"))
}

/// Open a scene through the manager, mapping refusals to `InvalidScene`
pub(crate) fn open_scene_async(
    scenes: &Rc<dyn SceneManager>,
    entry: &CatalogEntry,
    mode: LoadSceneMode,
) -> AsyncOp<()> {
    let id = entry.id.clone();
    scenes
        .load_scene_async(entry.key.trim(), mode)
        .map_err(move |err| invalid_scene(id, err.to_string()))
        .named(&entry.id)
}

/// Close a scene through the manager, mapping refusals to `InvalidScene`
pub(crate) fn close_scene_async(
    ctx: &ProviderContext<'_>,
    entry: &CatalogEntry,
) -> AsyncOp<()> {
    let scenes = match scene_target(ctx, entry) {
        Ok(scenes) => scenes,
        Err(err) => return AsyncOp::failed(err),
    };
    let id = entry.id.clone();
    scenes
        .unload_scene_async(entry.key.trim())
        .map_err(move |err| invalid_scene(id, err.to_string()))
        .named(&entry.id)
}
