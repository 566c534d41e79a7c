//! Loading session
//!
//! A [`Session`] is the explicit context every runtime load goes through. It
//! owns the catalog, the bundle cache and one provider per location type,
//! and is driven by the host calling [`Session::tick`] once per frame.
//!
//! Each asset id has at most one in-flight operation: a second request while
//! the first is pending gets the same [`AsyncOp`] back. Every request still
//! takes its own references on the bundle closure, so each
//! [`load_asset_async`](Session::load_asset_async) pairs with exactly one
//! [`release_asset`](Session::release_asset).
//!
//! ```ignore
//! let mut session = SessionBuilder::new()
//!     .with_resource_store(store)
//!     .with_bundle_store(bundles, bundle_catalog, package_dir)
//!     .build(catalog, Some(Platform::Android))?;
//!
//! let hero = session.load_asset_async("hero");
//! while hero.poll().is_pending() {
//!     session.tick();
//! }
//! session.release_asset("hero")?;
//! if let Some(mut report) = session.shutdown() {
//!     while !report.pending.is_empty() {
//!         report.pending.pump();
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::cache::{BundleCache, CacheStats, PendingUnloads};
use crate::catalog::Catalog;
use crate::config::BundleCatalog;
use crate::domain::{CatalogEntry, LocationType, Platform, Resource};
use crate::error::{AddressableError, Result, asset_not_loaded, config_invalid, provider_failure};
use crate::operation::{AsyncOp, OpStatus};
use crate::provider::{
    AnyProvider, BundleProvider, DirectAssetProvider, PackagedResourceProvider, Provider,
    ProviderContext,
};
use crate::store::{
    AssetDatabase, BundleStore, Downloader, LoadSceneMode, ResourceStore, SceneManager,
};

/// What [`Session::shutdown`] leaves behind
pub struct ShutdownReport {
    /// Cache statistics at shutdown
    pub stats: CacheStats,
    /// Released loads still in flight; pump until empty
    pub pending: PendingUnloads,
}

/// Collects the engine collaborators a [`Session`] needs
#[derive(Default)]
pub struct SessionBuilder {
    assets: Option<Rc<dyn AssetDatabase>>,
    resources: Option<Rc<dyn ResourceStore>>,
    bundles: Option<(Rc<dyn BundleStore>, BundleCatalog, PathBuf)>,
    downloader: Option<Rc<dyn Downloader>>,
    scenes: Option<Rc<dyn SceneManager>>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `DirectAsset` entries from the editor asset database
    #[must_use]
    pub fn with_asset_database(mut self, assets: Rc<dyn AssetDatabase>) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Serve `PackagedResource` entries from the player resource store
    #[must_use]
    pub fn with_resource_store(mut self, resources: Rc<dyn ResourceStore>) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Serve `Bundle` entries through a cache over `bundle_catalog`
    ///
    /// Local bundle files are read from `package_dir`.
    #[must_use]
    pub fn with_bundle_store(
        mut self,
        store: Rc<dyn BundleStore>,
        bundle_catalog: BundleCatalog,
        package_dir: impl Into<PathBuf>,
    ) -> Self {
        self.bundles = Some((store, bundle_catalog, package_dir.into()));
        self
    }

    #[must_use]
    pub fn with_downloader(mut self, downloader: Rc<dyn Downloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    #[must_use]
    pub fn with_scene_manager(mut self, scenes: Rc<dyn SceneManager>) -> Self {
        self.scenes = Some(scenes);
        self
    }

    /// Build the session
    ///
    /// With a platform the catalog is narrowed to the entries targeting it.
    ///
    /// # Errors
    ///
    /// `ConfigInvalid` if the catalog or bundle catalog was compiled for
    /// another platform, or a registered downloader has no bundle store.
    /// `CircularDependency` or `DependencyNotFound` if the bundle catalog's
    /// graph is broken.
    pub fn build(self, catalog: Catalog, platform: Option<Platform>) -> Result<Session> {
        let catalog = match platform {
            Some(platform) => {
                check_platform("catalog", catalog.platform(), platform)?;
                catalog.filter_by_platform(platform)
            }
            None => catalog,
        };

        let mut providers = BTreeMap::new();
        if let Some(assets) = self.assets {
            providers.insert(
                LocationType::DirectAsset,
                AnyProvider::Direct(DirectAssetProvider::new(assets)),
            );
        }
        if let Some(resources) = self.resources {
            providers.insert(
                LocationType::PackagedResource,
                AnyProvider::Packaged(PackagedResourceProvider::new(resources)),
            );
        }

        let cache = match self.bundles {
            Some((store, bundle_catalog, package_dir)) => {
                if let Some(platform) = platform {
                    check_platform("bundle catalog", bundle_catalog.platform, platform)?;
                }
                bundle_catalog.graph().validate()?;
                providers.insert(
                    LocationType::Bundle,
                    AnyProvider::Bundle(BundleProvider::new(Rc::clone(&store))),
                );
                let cache = BundleCache::new(bundle_catalog, store, package_dir);
                Some(match self.downloader {
                    Some(downloader) => cache.with_downloader(downloader),
                    None => cache,
                })
            }
            None if self.downloader.is_some() => {
                return Err(config_invalid(
                    "a downloader was registered without a bundle store",
                ));
            }
            None => None,
        };

        log::debug!(
            "Session built with {} entries and {} providers",
            catalog.len(),
            providers.len()
        );
        Ok(Session {
            catalog,
            cache,
            scenes: self.scenes,
            providers,
            leases: BTreeMap::new(),
            dependency_refs: BTreeMap::new(),
            scene_refs: BTreeMap::new(),
            scene_loads: Vec::new(),
            scene_unloads: Vec::new(),
        })
    }
}

fn check_platform(what: &str, compiled_for: Option<Platform>, platform: Platform) -> Result<()> {
    match compiled_for {
        Some(compiled) if compiled != platform => Err(config_invalid(format!(
            "{what} was compiled for {compiled}, not {platform}"
        ))),
        _ => Ok(()),
    }
}

/// The single operation shared by every request of one asset id
struct Lease {
    entry: CatalogEntry,
    op: AsyncOp<Resource>,
    /// Requests not yet released
    requests: usize,
    /// Requests that took provider references
    held: usize,
}

/// Explicit loading context; see the module docs
pub struct Session {
    catalog: Catalog,
    cache: Option<BundleCache>,
    scenes: Option<Rc<dyn SceneManager>>,
    providers: BTreeMap<LocationType, AnyProvider>,
    leases: BTreeMap<String, Lease>,
    dependency_refs: BTreeMap<String, usize>,
    scene_refs: BTreeMap<String, usize>,
    scene_loads: Vec<(String, AsyncOp<()>)>,
    scene_unloads: Vec<(String, AsyncOp<()>)>,
}

impl Session {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The bundle cache, if a bundle store is registered
    pub fn cache(&self) -> Option<&BundleCache> {
        self.cache.as_ref()
    }

    /// Load an asset synchronously
    ///
    /// A bundle asset only loads this way once its closure is loaded.
    ///
    /// # Errors
    ///
    /// `UnknownId`, `NoProvider`, or the provider's failure.
    pub fn load_asset(&mut self, id: &str) -> Result<Resource> {
        if let Some(lease) = self.leases.get(id) {
            return match lease.op.poll() {
                OpStatus::Done(resource) => {
                    self.add_request(id);
                    Ok(resource)
                }
                OpStatus::Pending => Err(provider_failure(id, "asset is still loading")),
                OpStatus::Failed(err) => Err(err),
            };
        }

        let entry = self.catalog.resolve(id)?.clone();
        let (result, took) = self.request(&entry, |p, ctx| p.load_asset(ctx, &entry))?;
        let resource = result?;
        self.leases.insert(
            entry.id.clone(),
            Lease {
                entry,
                op: AsyncOp::immediate(resource.clone()),
                requests: 1,
                held: usize::from(took),
            },
        );
        Ok(resource)
    }

    /// Begin loading an asset
    ///
    /// A request for an id already loading (or loaded) hands back the same
    /// operation. Resolution failures arrive through the operation.
    pub fn load_asset_async(&mut self, id: &str) -> AsyncOp<Resource> {
        if self.leases.contains_key(id) {
            return self.add_request(id);
        }

        let entry = match self.catalog.resolve(id) {
            Ok(entry) => entry.clone(),
            Err(err) => return AsyncOp::failed(err),
        };
        let (op, took) = match self.request(&entry, |p, ctx| p.load_asset_async(ctx, &entry)) {
            Ok(requested) => requested,
            Err(err) => return AsyncOp::failed(err),
        };
        // Already failed: no lease, whatever the location.
        if matches!(op.poll(), OpStatus::Failed(_)) {
            if took {
                self.release_quietly(&entry);
            }
            return op;
        }
        log::debug!("Loading asset '{id}'");
        self.leases.insert(
            entry.id.clone(),
            Lease {
                entry,
                op: op.clone(),
                requests: 1,
                held: usize::from(took),
            },
        );
        op
    }

    /// Give back one request of `id`
    ///
    /// Releasing the last request of a pending load abandons it.
    ///
    /// # Errors
    ///
    /// `AssetNotLoaded` if the id has no outstanding request.
    pub fn release_asset(&mut self, id: &str) -> Result<()> {
        let lease = self.leases.get_mut(id).ok_or_else(|| asset_not_loaded(id))?;
        lease.requests -= 1;
        let give_back = lease.held > lease.requests;
        if give_back {
            lease.held -= 1;
        }
        let entry = lease.entry.clone();

        if lease.requests == 0 {
            if let Some(lease) = self.leases.remove(id) {
                lease.op.cancel();
            }
            log::debug!("Asset '{id}' released");
        }
        if give_back {
            self.release_refs(&entry)?;
        }
        Ok(())
    }

    /// Abandon every request of `id`
    ///
    /// The references taken for them are released now. Physical loads
    /// already issued finish and are unloaded as they arrive.
    ///
    /// # Errors
    ///
    /// `AssetNotLoaded` if the id has no outstanding request.
    pub fn cancel(&mut self, id: &str) -> Result<()> {
        let lease = self.leases.remove(id).ok_or_else(|| asset_not_loaded(id))?;
        log::debug!("Cancelling {} request(s) of '{id}'", lease.requests);
        lease.op.cancel();
        for _ in 0..lease.held {
            self.release_refs(&lease.entry)?;
        }
        Ok(())
    }

    /// Number of outstanding requests of `id`
    pub fn request_count(&self, id: &str) -> usize {
        self.leases.get(id).map_or(0, |l| l.requests)
    }

    /// Whether `id` has an outstanding request that finished loading
    pub fn is_loaded(&self, id: &str) -> bool {
        self.leases
            .get(id)
            .is_some_and(|l| matches!(l.op.poll(), OpStatus::Done(_)))
    }

    /// Open a scene synchronously; returns whether it opened
    ///
    /// # Errors
    ///
    /// `UnknownId` or `NoProvider`. Scene failures return `false`.
    pub fn load_scene(&mut self, id: &str, mode: LoadSceneMode) -> Result<bool> {
        let entry = self.catalog.resolve(id)?.clone();
        let (opened, took) = self.request(&entry, |p, ctx| p.load_scene(ctx, &entry, mode))?;
        if opened && took {
            *self.scene_refs.entry(entry.id).or_default() += 1;
        }
        Ok(opened)
    }

    /// Begin opening a scene
    ///
    /// For a bundle scene, the bundle closure stays referenced until the
    /// scene is unloaded.
    pub fn load_scene_async(&mut self, id: &str, mode: LoadSceneMode) -> AsyncOp<()> {
        let entry = match self.catalog.resolve(id) {
            Ok(entry) => entry.clone(),
            Err(err) => return AsyncOp::failed(err),
        };
        match self.request(&entry, |p, ctx| p.load_scene_async(ctx, &entry, mode)) {
            Ok((op, took)) => {
                if took {
                    *self.scene_refs.entry(entry.id.clone()).or_default() += 1;
                    self.scene_loads.push((entry.id, op.clone()));
                }
                op
            }
            Err(err) => AsyncOp::failed(err),
        }
    }

    /// Begin closing a scene
    ///
    /// Its dependencies are released at the first [`tick`](Self::tick)
    /// after the scene has closed.
    pub fn unload_scene_async(&mut self, id: &str) -> AsyncOp<()> {
        let entry = match self.catalog.resolve(id) {
            Ok(entry) => entry.clone(),
            Err(err) => return AsyncOp::failed(err),
        };
        match self.call(&entry, |p, ctx| p.unload_scene_async(ctx, &entry)) {
            Ok(op) => {
                self.scene_unloads.push((entry.id, op.clone()));
                op
            }
            Err(err) => AsyncOp::failed(err),
        }
    }

    /// Load what the entry needs without loading the entry itself
    pub fn load_dependencies_async(&mut self, id: &str) -> AsyncOp<()> {
        let entry = match self.catalog.resolve(id) {
            Ok(entry) => entry.clone(),
            Err(err) => return AsyncOp::failed(err),
        };
        match self.request(&entry, |p, ctx| p.load_dependencies_async(ctx, &entry)) {
            Ok((op, took)) => {
                if took {
                    *self.dependency_refs.entry(entry.id).or_default() += 1;
                }
                op
            }
            Err(err) => AsyncOp::failed(err),
        }
    }

    /// Give back one [`load_dependencies_async`](Self::load_dependencies_async)
    ///
    /// # Errors
    ///
    /// `AssetNotLoaded` if no dependency load of `id` is outstanding.
    pub fn unload_dependencies(&mut self, id: &str) -> Result<()> {
        let held = self
            .dependency_refs
            .get_mut(id)
            .filter(|count| **count > 0)
            .ok_or_else(|| asset_not_loaded(id))?;
        *held -= 1;
        if *held == 0 {
            self.dependency_refs.remove(id);
        }
        let entry = self.catalog.resolve(id)?.clone();
        self.release_refs(&entry)
    }

    /// Advance bookkeeping by one frame
    ///
    /// Failed asset loads give back their references, closed scenes release
    /// their dependencies and finished drained bundle loads are unloaded.
    pub fn tick(&mut self) {
        let failed: Vec<String> = self
            .leases
            .iter()
            .filter(|(_, lease)| matches!(lease.op.poll(), OpStatus::Failed(_)))
            .map(|(id, _)| id.clone())
            .collect();
        for id in failed {
            if let Some(lease) = self.leases.remove(&id) {
                if let OpStatus::Failed(err) = lease.op.poll() {
                    log::warn!("Loading '{id}' failed: {err}");
                }
                for _ in 0..lease.held {
                    self.release_quietly(&lease.entry);
                }
            }
        }

        for (id, op) in std::mem::take(&mut self.scene_loads) {
            match op.poll() {
                OpStatus::Pending => self.scene_loads.push((id, op)),
                OpStatus::Done(()) => {}
                OpStatus::Failed(err) => {
                    log::warn!("Opening scene '{id}' failed: {err}");
                    self.release_scene(&id);
                }
            }
        }

        for (id, op) in std::mem::take(&mut self.scene_unloads) {
            match op.poll() {
                OpStatus::Pending => self.scene_unloads.push((id, op)),
                OpStatus::Done(()) => self.release_scene(&id),
                OpStatus::Failed(err) => log::warn!("Closing scene '{id}' failed: {err}"),
            }
        }

        if let Some(cache) = self.cache.as_mut() {
            cache.pump();
        }
    }

    /// Release every outstanding reference and tear the session down
    ///
    /// Returns a report when a bundle store was used. Bundle loads still in
    /// flight are handed over in [`ShutdownReport::pending`].
    pub fn shutdown(mut self) -> Option<ShutdownReport> {
        let leases = std::mem::take(&mut self.leases);
        for (_, lease) in leases {
            lease.op.cancel();
            for _ in 0..lease.held {
                self.release_quietly(&lease.entry);
            }
        }
        let outstanding = std::mem::take(&mut self.dependency_refs)
            .into_iter()
            .chain(std::mem::take(&mut self.scene_refs));
        for (id, count) in outstanding {
            if let Ok(entry) = self.catalog.resolve(&id).cloned() {
                for _ in 0..count {
                    self.release_quietly(&entry);
                }
            }
        }
        self.scene_loads.clear();
        self.scene_unloads.clear();

        let mut cache = self.cache.take()?;
        cache.pump();
        let stats = cache.stats();
        log::debug!("Session shut down: {stats}");
        Some(ShutdownReport {
            stats,
            pending: cache.into_pending(),
        })
    }

    /// One more request on an existing lease, returning its operation
    fn add_request(&mut self, id: &str) -> AsyncOp<Resource> {
        let Some(entry) = self.leases.get(id).map(|l| l.entry.clone()) else {
            return AsyncOp::failed(asset_not_loaded(id));
        };
        let took = match self.request(&entry, |p, ctx| p.load_dependencies_async(ctx, &entry)) {
            Ok((_, took)) => took,
            Err(err) => return AsyncOp::failed(err),
        };
        match self.leases.get_mut(id) {
            Some(lease) => {
                lease.requests += 1;
                lease.held += usize::from(took);
                lease.op.clone()
            }
            None => AsyncOp::failed(asset_not_loaded(id)),
        }
    }

    /// Run a provider call for `entry`
    fn call<R>(
        &mut self,
        entry: &CatalogEntry,
        f: impl FnOnce(&AnyProvider, &mut ProviderContext<'_>) -> R,
    ) -> Result<R> {
        let provider = self
            .providers
            .get(&entry.location)
            .ok_or_else(|| AddressableError::NoProvider {
                location: entry.location.to_string(),
            })?;
        let mut ctx = ProviderContext {
            cache: self.cache.as_mut(),
            scenes: self.scenes.as_ref(),
        };
        Ok(f(provider, &mut ctx))
    }

    /// Run a provider call and report whether it kept a reference
    ///
    /// Only bundle entries hold references; for the others releasing is a
    /// no-op, so they always count as holding one.
    fn request<R>(
        &mut self,
        entry: &CatalogEntry,
        f: impl FnOnce(&AnyProvider, &mut ProviderContext<'_>) -> R,
    ) -> Result<(R, bool)> {
        let before = self.bundle_refs(entry);
        let value = self.call(entry, f)?;
        let took = entry.location != LocationType::Bundle || self.bundle_refs(entry) > before;
        Ok((value, took))
    }

    fn bundle_refs(&self, entry: &CatalogEntry) -> usize {
        match (entry.bundle(), self.cache.as_ref()) {
            (Some(bundle), Some(cache)) => cache.refcount(bundle),
            _ => 0,
        }
    }

    fn release_refs(&mut self, entry: &CatalogEntry) -> Result<()> {
        self.call(entry, |p, ctx| p.unload_dependencies(ctx, entry))?
    }

    fn release_quietly(&mut self, entry: &CatalogEntry) {
        if let Err(err) = self.release_refs(entry) {
            log::warn!("Releasing '{}' failed: {err}", entry.id);
        }
    }

    fn release_scene(&mut self, id: &str) {
        let Some(count) = self.scene_refs.get_mut(id) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.scene_refs.remove(id);
        }
        if let Ok(entry) = self.catalog.resolve(id).cloned() {
            self.release_quietly(&entry);
        }
    }
}
