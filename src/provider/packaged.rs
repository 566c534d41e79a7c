//! Packaged resource provider
//!
//! Loads by path from the flat store compiled into the player. There is no
//! dependency concept.
//!
//! Paths the store reported absent are remembered, and later requests for
//! them fail with `ProviderFailure` without consulting the store again. This
//! negative cache is deliberate: the store is immutable for the lifetime of
//! the player, so a miss stays a miss.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use super::{Provider, ProviderContext, close_scene_async, open_scene_async, physical_key, scene_target};
use crate::domain::{CatalogEntry, LocationType, Resource};
use crate::error::{AddressableError, Result, provider_failure};
use crate::operation::AsyncOp;
use crate::store::{LoadSceneMode, ResourceStore};

pub struct PackagedResourceProvider {
    store: Rc<dyn ResourceStore>,
    absent: Rc<RefCell<BTreeSet<String>>>,
}

fn absent_error(entry_id: &str, path: &str) -> AddressableError {
    provider_failure(entry_id, format!("no packaged resource at '{path}'"))
}

impl PackagedResourceProvider {
    pub fn new(store: Rc<dyn ResourceStore>) -> Self {
        Self {
            store,
            absent: Rc::new(RefCell::new(BTreeSet::new())),
        }
    }

    /// Whether `path` is remembered as absent
    pub fn is_known_absent(&self, path: &str) -> bool {
        self.absent.borrow().contains(path)
    }
}

impl Provider for PackagedResourceProvider {
    fn location(&self) -> LocationType {
        LocationType::PackagedResource
    }

    fn load_asset(&self, _ctx: &mut ProviderContext<'_>, entry: &CatalogEntry) -> Result<Resource> {
        let path = physical_key(entry)?;
        if self.is_known_absent(path) {
            return Err(absent_error(&entry.id, path));
        }
        match self.store.load(path) {
            Some(resource) => Ok(resource),
            None => {
                log::debug!("Packaged resource '{path}' is absent, remembering");
                self.absent.borrow_mut().insert(path.to_string());
                Err(absent_error(&entry.id, path))
            }
        }
    }

    fn load_asset_async(
        &self,
        _ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> AsyncOp<Resource> {
        let path = match physical_key(entry) {
            Ok(path) => path.to_string(),
            Err(err) => return AsyncOp::failed(err),
        };
        if self.is_known_absent(&path) {
            return AsyncOp::failed(absent_error(&entry.id, &path));
        }

        let absent = Rc::clone(&self.absent);
        let id = entry.id.clone();
        self.store
            .load_async(&path)
            .and_then(move |loaded| match loaded {
                Some(resource) => AsyncOp::immediate(resource),
                None => {
                    log::debug!("Packaged resource '{path}' is absent, remembering");
                    let err = absent_error(&id, &path);
                    absent.borrow_mut().insert(path);
                    AsyncOp::failed(err)
                }
            })
            .named(&entry.id)
    }

    fn load_scene(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
        mode: LoadSceneMode,
    ) -> bool {
        scene_target(ctx, entry).is_ok_and(|scenes| scenes.load_scene(entry.key.trim(), mode))
    }

    fn load_scene_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
        mode: LoadSceneMode,
    ) -> AsyncOp<()> {
        match scene_target(ctx, entry) {
            Ok(scenes) => open_scene_async(&scenes, entry, mode),
            Err(err) => AsyncOp::failed(err),
        }
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
        _ctx: &mut ProviderContext<'_>,
        _entry: &CatalogEntry,
    ) -> AsyncOp<()> {
        AsyncOp::immediate(())
    }

    fn unload_dependencies(
        &self,
        _ctx: &mut ProviderContext<'_>,
        _entry: &CatalogEntry,
    ) -> Result<()> {
        Ok(())
    }
}
