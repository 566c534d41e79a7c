//! Bundle provider
//!
//! The only provider that goes through the [`BundleCache`]. Every request
//! takes one cache reference on the entry's bundle closure; the matching
//! [`unload_dependencies`](Provider::unload_dependencies) gives it back. An
//! asset is read from its bundle only once the whole closure is loaded.

use std::rc::Rc;

use super::{Provider, ProviderContext, close_scene_async, open_scene_async, physical_key, scene_target};
use crate::cache::BundleCache;
use crate::domain::{CatalogEntry, LocationType, Resource};
use crate::error::{AddressableError, Result, invalid_location, provider_failure};
use crate::operation::{AsyncOp, OpStatus};
use crate::store::{BundleStore, LoadSceneMode};

pub struct BundleProvider {
    store: Rc<dyn BundleStore>,
}

fn no_cache() -> AddressableError {
    AddressableError::NoProvider {
        location: LocationType::Bundle.to_string(),
    }
}

/// The entry's bundle name and physical key
fn bundle_target(entry: &CatalogEntry) -> Result<(&str, &str)> {
    let key = physical_key(entry)?;
    let bundle = entry
        .bundle()
        .ok_or_else(|| invalid_location(&entry.id, "bundle entry without a bundle name"))?;
    Ok((bundle, key))
}

impl BundleProvider {
    pub fn new(store: Rc<dyn BundleStore>) -> Self {
        Self { store }
    }

    /// Take a cache reference on the entry's bundle closure
    fn acquire(
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> Result<(String, AsyncOp<Resource>)> {
        let (bundle, _) = bundle_target(entry)?;
        let cache = ctx.cache.as_deref_mut().ok_or_else(no_cache)?;
        let op = cache.load(bundle)?;
        Ok((bundle.to_string(), op))
    }

    /// Poll a freshly acquired bundle once for synchronous callers
    ///
    /// The reference is given back unless the bundle is ready.
    fn acquire_now(
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> Result<Resource> {
        let (bundle, op) = Self::acquire(ctx, entry)?;
        match op.poll() {
            OpStatus::Done(loaded) => Ok(loaded),
            status => {
                if let Some(cache) = ctx.cache.as_deref_mut() {
                    release_quietly(cache, &bundle);
                }
                Err(match status {
                    OpStatus::Failed(err) => err,
                    _ => provider_failure(&entry.id, format!("bundle '{bundle}' is still loading")),
                })
            }
        }
    }
}

fn release_quietly(cache: &mut BundleCache, bundle: &str) {
    if let Err(err) = cache.release(bundle) {
        log::warn!("Releasing bundle '{bundle}' failed: {err}");
    }
}

impl Provider for BundleProvider {
    fn location(&self) -> LocationType {
        LocationType::Bundle
    }

    /// Load synchronously; succeeds only if the closure is already loaded
    ///
    /// On success the bundle reference stays held for the asset.
    fn load_asset(&self, ctx: &mut ProviderContext<'_>, entry: &CatalogEntry) -> Result<Resource> {
        let loaded = Self::acquire_now(ctx, entry)?;
        let status = self.store.load_asset(&loaded, &entry.asset_name).poll();
        let result = match status {
            OpStatus::Done(asset) => return Ok(asset),
            OpStatus::Failed(err) => Err(err),
            OpStatus::Pending => Err(provider_failure(
                &entry.id,
                "asset cannot be loaded synchronously",
            )),
        };
        if let (Ok((bundle, _)), Some(cache)) = (bundle_target(entry), ctx.cache.as_deref_mut()) {
            release_quietly(cache, bundle);
        }
        result
    }

    fn load_asset_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> AsyncOp<Resource> {
        let (_, op) = match Self::acquire(ctx, entry) {
            Ok(acquired) => acquired,
            Err(err) => return AsyncOp::failed(err),
        };
        let store = Rc::clone(&self.store);
        let asset_name = entry.asset_name.clone();
        op.and_then(move |loaded| store.load_asset(&loaded, &asset_name))
            .named(&entry.id)
    }

    fn load_scene(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
        mode: LoadSceneMode,
    ) -> bool {
        let Ok(scenes) = scene_target(ctx, entry) else {
            return false;
        };
        if Self::acquire_now(ctx, entry).is_err() {
            return false;
        }
        if scenes.load_scene(entry.key.trim(), mode) {
            return true;
        }
        if let (Ok((bundle, _)), Some(cache)) = (bundle_target(entry), ctx.cache.as_deref_mut()) {
            release_quietly(cache, bundle);
        }
        false
    }

    /// Load the closure, then open the scene
    ///
    /// The bundle reference is held until the scene's dependencies are
    /// unloaded.
    fn load_scene_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
        mode: LoadSceneMode,
    ) -> AsyncOp<()> {
        let scenes = match scene_target(ctx, entry) {
            Ok(scenes) => scenes,
            Err(err) => return AsyncOp::failed(err),
        };
        let (_, op) = match Self::acquire(ctx, entry) {
            Ok(acquired) => acquired,
            Err(err) => return AsyncOp::failed(err),
        };
        let entry = entry.clone();
        let id = entry.id.clone();
        op.and_then(move |_| open_scene_async(&scenes, &entry, mode))
            .named(id)
    }

    fn unload_scene_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> AsyncOp<()> {
        close_scene_async(ctx, entry)
    }

    fn load_dependencies_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> AsyncOp<()> {
        match Self::acquire(ctx, entry) {
            Ok((_, op)) => op.map(|_| ()).named(&entry.id),
            Err(err) => AsyncOp::failed(err),
        }
    }

    fn unload_dependencies(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> Result<()> {
        let (bundle, _) = bundle_target(entry)?;
        let cache = ctx.cache.as_deref_mut().ok_or_else(no_cache)?;
        cache.release(bundle)
    }
}
