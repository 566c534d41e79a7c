//! Editor asset database provider
//!
//! Used for fast iteration in the editor: assets load synchronously by
//! physical key and there is no bundle layer, so dependencies are always
//! satisfied.

use std::rc::Rc;

use super::{Provider, ProviderContext, close_scene_async, open_scene_async, physical_key, scene_target};
use crate::domain::{CatalogEntry, LocationType, Resource};
use crate::error::{Result, provider_failure};
use crate::operation::AsyncOp;
use crate::store::{AssetDatabase, LoadSceneMode};

pub struct DirectAssetProvider {
    database: Rc<dyn AssetDatabase>,
}

impl DirectAssetProvider {
    pub fn new(database: Rc<dyn AssetDatabase>) -> Self {
        Self { database }
    }
}

impl Provider for DirectAssetProvider {
    fn location(&self) -> LocationType {
        LocationType::DirectAsset
    }

    fn load_asset(&self, _ctx: &mut ProviderContext<'_>, entry: &CatalogEntry) -> Result<Resource> {
        let key = physical_key(entry)?;
        self.database
            .load_by_key(key)
            .ok_or_else(|| provider_failure(&entry.id, format!("no asset with key '{key}'")))
    }

    /// The synchronous load, already settled
    fn load_asset_async(
        &self,
        ctx: &mut ProviderContext<'_>,
        entry: &CatalogEntry,
    ) -> AsyncOp<Resource> {
        AsyncOp::from_result(self.load_asset(ctx, entry)).named(&entry.id)
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
