//! Reference-counted bundle cache
//!
//! The cache is the only owner of bundle state. Every bundle it holds has a
//! handle with a reference count, and both transitions happen synchronously
//! inside [`BundleCache::load`] and [`BundleCache::release`]:
//!
//! ```text
//! Unloaded --load--> Loaded(1) --load--> Loaded(n+1)
//! Loaded(n+1) --release--> Loaded(n) --release to 0--> Unloaded
//! ```
//!
//! Every load of a bundle first loads each of its direct dependencies, so a
//! load takes one reference on each bundle of the closure and the matching
//! release gives them back. A bundle is unloaded before its dependencies are
//! released: a dependency is never unloaded while a loaded bundle needs it.
//!
//! ## Physical loads
//!
//! Local bundles load from the package directory. Remote bundles are fetched
//! by the [`Downloader`] first. A physical load can span ticks; when a bundle
//! is released before its load finished, the load moves to a draining list
//! and [`BundleCache::pump`] unloads the result once it arrives. Loading the
//! bundle again in the meantime adopts the pending load.

pub mod stats;


use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

pub use stats::CacheStats;

use crate::config::{BundleCatalog, BundleInfo, BundleLocation};
use crate::domain::Resource;
use crate::error::{Result, bundle_not_in_manifest, bundle_not_loaded, provider_failure};
use crate::operation::{AsyncOp, OpStatus};
use crate::store::{BundleStore, Downloader};

/// One held bundle
struct BundleHandle {
    refcount: usize,
    /// The engine load of this bundle alone
    physical: AsyncOp<Resource>,
    /// Settles once the bundle and its whole closure are loaded
    op: AsyncOp<Resource>,
}

/// Loads bundles with their dependency closure and counts references
pub struct BundleCache {
    catalog: BundleCatalog,
    store: Rc<dyn BundleStore>,
    downloader: Option<Rc<dyn Downloader>>,
    package_dir: PathBuf,
    handles: BTreeMap<String, BundleHandle>,
    draining: Vec<(String, AsyncOp<Resource>)>,
    stats: CacheStats,
}

impl BundleCache {
    /// Create a cache over a shipped bundle catalog
    ///
    /// Local bundle files are read from `package_dir`.
    pub fn new(catalog: BundleCatalog, store: Rc<dyn BundleStore>, package_dir: PathBuf) -> Self {
        Self {
            catalog,
            store,
            downloader: None,
            package_dir,
            handles: BTreeMap::new(),
            draining: Vec::new(),
            stats: CacheStats::default(),
        }
    }

    /// Register the collaborator that fetches remote bundles
    #[must_use]
    pub fn with_downloader(mut self, downloader: Rc<dyn Downloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    pub fn catalog(&self) -> &BundleCatalog {
        &self.catalog
    }

    /// Take a reference on `name` and on every bundle of its closure
    ///
    /// Each call recursively loads the direct dependencies first, so a
    /// dependency holds one reference per request that reaches it. A bundle
    /// already held (loaded or still loading) only has its count bumped and
    /// hands back the same operation.
    ///
    /// # Errors
    ///
    /// `BundleNotInManifest` if the bundle or one of its dependencies is not
    /// in the bundle catalog. Nothing stays referenced on error.
    pub fn load(&mut self, name: &str) -> Result<AsyncOp<Resource>> {
        let info = self
            .catalog
            .get(name)
            .cloned()
            .ok_or_else(|| bundle_not_in_manifest(name))?;

        let mut dep_ops = Vec::with_capacity(info.dependencies.len());
        for (index, dep) in info.dependencies.iter().enumerate() {
            match self.load(dep) {
                Ok(op) => dep_ops.push(op),
                Err(err) => {
                    for loaded in info.dependencies[..index].iter().rev() {
                        // Loaded just above, cannot fail.
                        let _ = self.release(loaded);
                    }
                    return Err(err);
                }
            }
        }

        if let Some(handle) = self.handles.get_mut(name) {
            handle.refcount += 1;
            log::debug!("Bundle '{name}' refcount -> {}", handle.refcount);
            return Ok(handle.op.clone());
        }

        let physical = match self.adopt_draining(name) {
            Some(op) => op,
            None => self.issue_physical(name, &info),
        };
        let op = AsyncOp::join(AsyncOp::join_all(dep_ops), physical.clone(), |_, bundle| {
            bundle
        })
        .named(name);

        self.handles.insert(
            name.to_string(),
            BundleHandle {
                refcount: 1,
                physical,
                op: op.clone(),
            },
        );
        log::debug!("Bundle '{name}' refcount -> 1");
        Ok(op)
    }

    /// Drop the references one [`load`](Self::load) of `name` took
    ///
    /// The bundle's own count drops first; at zero it is unloaded (or left
    /// to drain if still loading). Then each direct dependency is released
    /// the same way, so parents always unload before their dependencies.
    ///
    /// # Errors
    ///
    /// `BundleNotLoaded` if no reference is held.
    pub fn release(&mut self, name: &str) -> Result<()> {
        let handle = self
            .handles
            .get_mut(name)
            .ok_or_else(|| bundle_not_loaded(name))?;
        handle.refcount -= 1;
        log::debug!("Bundle '{name}' refcount -> {}", handle.refcount);

        if handle.refcount == 0 {
            if let Some(handle) = self.handles.remove(name) {
                self.unload_physical(name, handle.physical);
            }
        }

        let dependencies = self
            .catalog
            .get(name)
            .map(|info| info.dependencies.clone())
            .unwrap_or_default();
        for dep in &dependencies {
            self.release(dep)?;
        }
        Ok(())
    }

    /// Unload drained bundles whose physical load has finished
    ///
    /// Returns how many were unloaded.
    pub fn pump(&mut self) -> usize {
        let mut draining = std::mem::take(&mut self.draining);
        let unloaded = drain_finished(&mut draining, |name, bundle| {
            log::debug!("Unloading drained bundle '{name}'");
            self.store.unload_bundle(name, bundle);
            self.stats.physical_unloads += 1;
        });
        self.draining = draining;
        unloaded
    }

    /// Tear the cache down, handing over loads still in flight
    ///
    /// Held bundles are not released here; release them first.
    pub fn into_pending(mut self) -> PendingUnloads {
        PendingUnloads {
            store: Rc::clone(&self.store),
            draining: std::mem::take(&mut self.draining),
        }
    }

    /// Current reference count; zero for bundles not held
    pub fn refcount(&self, name: &str) -> usize {
        self.handles.get(name).map_or(0, |h| h.refcount)
    }

    /// Whether the bundle is held and physically loaded
    pub fn is_loaded(&self, name: &str) -> bool {
        self.handles
            .get(name)
            .is_some_and(|h| matches!(h.physical.poll(), OpStatus::Done(_)))
    }

    /// Names of held bundles, loaded or loading
    pub fn loaded_bundles(&self) -> Vec<String> {
        self.handles.keys().cloned().collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            held: self.handles.len(),
            draining: self.draining.len(),
            ..self.stats
        }
    }

    fn adopt_draining(&mut self, name: &str) -> Option<AsyncOp<Resource>> {
        let index = self.draining.iter().position(|(n, _)| n == name)?;
        log::debug!("Bundle '{name}' adopts its draining load");
        Some(self.draining.swap_remove(index).1)
    }

    fn issue_physical(&mut self, name: &str, info: &BundleInfo) -> AsyncOp<Resource> {
        self.stats.physical_loads += 1;
        match info.location {
            BundleLocation::Local => {
                log::debug!("Loading local bundle '{name}'");
                self.store
                    .load_bundle(name, &self.package_dir.join(&info.file))
                    .named(name)
            }
            BundleLocation::Remote => {
                let Some(downloader) = &self.downloader else {
                    return AsyncOp::failed(provider_failure(
                        name,
                        "remote bundle but no downloader is registered",
                    ));
                };
                log::debug!("Fetching remote bundle '{name}'");
                let store = Rc::clone(&self.store);
                let bundle = name.to_string();
                downloader
                    .fetch(name, info)
                    .and_then(move |path| store.load_bundle(&bundle, &path))
                    .named(name)
            }
        }
    }

    fn unload_physical(&mut self, name: &str, physical: AsyncOp<Resource>) {
        match physical.poll() {
            OpStatus::Done(bundle) => self.unload_now(name, &bundle),
            OpStatus::Pending => {
                log::debug!("Bundle '{name}' released while loading, draining");
                self.draining.push((name.to_string(), physical));
            }
            OpStatus::Failed(_) => {}
        }
    }

    fn unload_now(&mut self, name: &str, bundle: &Resource) {
        log::debug!("Unloading bundle '{name}'");
        self.store.unload_bundle(name, bundle);
        self.stats.physical_unloads += 1;
    }
}

impl Drop for BundleCache {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            log::warn!(
                "Bundle cache dropped with {} bundles still referenced",
                self.handles.len()
            );
        }
        if !self.draining.is_empty() {
            log::warn!(
                "Bundle cache dropped with {} loads still in flight; they will never be unloaded",
                self.draining.len()
            );
        }
    }
}

/// Released bundle loads that were still in flight when their cache was
/// torn down
///
/// Pump until empty: each bundle is unloaded as soon as its load arrives.
#[must_use = "bundles of pending loads leak unless pumped until empty"]
pub struct PendingUnloads {
    store: Rc<dyn BundleStore>,
    draining: Vec<(String, AsyncOp<Resource>)>,
}

impl PendingUnloads {
    /// Unload every bundle whose load has finished; returns how many
    pub fn pump(&mut self) -> usize {
        let store = Rc::clone(&self.store);
        drain_finished(&mut self.draining, |name, bundle| {
            log::debug!("Unloading bundle '{name}' after shutdown");
            store.unload_bundle(name, bundle);
        })
    }

    pub fn is_empty(&self) -> bool {
        self.draining.is_empty()
    }

    pub fn len(&self) -> usize {
        self.draining.len()
    }

    /// Names of the bundles still loading
    pub fn bundles(&self) -> impl Iterator<Item = &str> {
        self.draining.iter().map(|(name, _)| name.as_str())
    }
}

impl Drop for PendingUnloads {
    fn drop(&mut self) {
        if !self.draining.is_empty() {
            log::warn!(
                "{} bundle loads dropped while in flight; they will never be unloaded",
                self.draining.len()
            );
        }
    }
}

/// Poll every draining load, unloading the finished ones; returns how many
fn drain_finished(
    draining: &mut Vec<(String, AsyncOp<Resource>)>,
    mut unload: impl FnMut(&str, &Resource),
) -> usize {
    let mut unloaded = 0;
    for (name, physical) in std::mem::take(draining) {
        match physical.poll() {
            OpStatus::Pending => draining.push((name, physical)),
            OpStatus::Done(bundle) => {
                unload(&name, &bundle);
                unloaded += 1;
            }
            OpStatus::Failed(err) => {
                log::debug!("Drained load of '{name}' failed: {err}");
            }
        }
    }
    unloaded
}
