use std::path::PathBuf;
use std::rc::Rc;

use super::*;
use crate::error::AddressableError;
use crate::operation::OpStatus;
use crate::test_fixtures::{
    FakeAsset, FakeAssetDatabase, FakeBundleStore, FakeResourceStore, FakeSceneManager,
    bundle_catalog,
};

fn asset_name(resource: &Resource) -> String {
    resource.downcast_ref::<FakeAsset>().unwrap().0.clone()
}

fn scene_manager(scenes: &[&str]) -> (Rc<FakeSceneManager>, Rc<dyn SceneManager>) {
    let fake = Rc::new(FakeSceneManager::with(scenes));
    let shared: Rc<dyn SceneManager> = fake.clone();
    (fake, shared)
}

fn bare_context<'a>() -> ProviderContext<'a> {
    ProviderContext {
        cache: None,
        scenes: None,
    }
}

#[test]
fn test_direct_load() {
    let provider = DirectAssetProvider::new(Rc::new(FakeAssetDatabase::with(&["guid-1"])));
    let mut ctx = bare_context();

    let hero = CatalogEntry::direct("hero", "guid-1");
    assert_eq!(asset_name(&provider.load_asset(&mut ctx, &hero).unwrap()), "guid-1");

    let op = provider.load_asset_async(&mut ctx, &hero);
    assert!(op.is_settled());
    assert!(matches!(
        provider.load_dependencies_async(&mut ctx, &hero).poll(),
        OpStatus::Done(())
    ));
    assert!(provider.unload_dependencies(&mut ctx, &hero).is_ok());

    let missing = CatalogEntry::direct("ghost", "guid-2");
    assert!(matches!(
        provider.load_asset(&mut ctx, &missing).unwrap_err(),
        AddressableError::ProviderFailure { .. }
    ));
}

#[test]
fn test_missing_key_is_invalid_location() {
    let provider = DirectAssetProvider::new(Rc::new(FakeAssetDatabase::default()));
    let mut ctx = bare_context();
    let entry = CatalogEntry::direct("blank", "  ");
    assert!(matches!(
        provider.load_asset_async(&mut ctx, &entry).poll(),
        OpStatus::Failed(AddressableError::InvalidLocation { .. })
    ));
}

#[test]
fn test_packaged_negative_cache() {
    let store = Rc::new(FakeResourceStore::with(&["UI/logo"]));
    let provider = PackagedResourceProvider::new(store.clone());
    let mut ctx = bare_context();

    let logo = CatalogEntry::packaged("logo", "UI/logo");
    assert!(provider.load_asset(&mut ctx, &logo).is_ok());
    assert_eq!(store.lookups(), 1);

    let missing = CatalogEntry::packaged("banner", "UI/banner");
    assert!(provider.load_asset(&mut ctx, &missing).is_err());
    assert_eq!(store.lookups(), 2);
    assert!(provider.is_known_absent("UI/banner"));

    let err = provider.load_asset(&mut ctx, &missing).unwrap_err();
    assert!(matches!(err, AddressableError::ProviderFailure { .. }));
    assert!(matches!(
        provider.load_asset_async(&mut ctx, &missing).poll(),
        OpStatus::Failed(_)
    ));
    assert_eq!(store.lookups(), 2);
}

#[test]
fn test_packaged_async_remembers_absence() {
    let store = Rc::new(FakeResourceStore::with(&["a"]).manual());
    let provider = PackagedResourceProvider::new(store.clone());
    let mut ctx = bare_context();

    let found = provider.load_asset_async(&mut ctx, &CatalogEntry::packaged("a", "a"));
    let absent = provider.load_asset_async(&mut ctx, &CatalogEntry::packaged("b", "b"));
    assert!(found.poll().is_pending());
    assert!(!provider.is_known_absent("b"));

    store.complete_all();
    assert_eq!(asset_name(&found.poll().into_result().unwrap().unwrap()), "a");
    assert!(matches!(absent.poll(), OpStatus::Failed(_)));
    assert!(provider.is_known_absent("b"));
}

#[test]
fn test_bundle_asset_holds_closure() {
    let store = Rc::new(FakeBundleStore::default());
    let mut cache = BundleCache::new(
        bundle_catalog(&[("chars", &["shared"]), ("shared", &[])]),
        store.clone(),
        PathBuf::from("pkg"),
    );
    let provider = BundleProvider::new(store.clone());
    let hero = CatalogEntry::bundled("hero", "Chars/hero.prefab", "chars");

    {
        let mut ctx = ProviderContext {
            cache: Some(&mut cache),
            scenes: None,
        };
        let op = provider.load_asset_async(&mut ctx, &hero);
        let OpStatus::Done(asset) = op.poll() else {
            panic!("asset should load");
        };
        assert_eq!(asset_name(&asset), "chars/hero.prefab");
    }
    assert_eq!(cache.refcount("chars"), 1);
    assert_eq!(cache.refcount("shared"), 1);

    {
        let mut ctx = ProviderContext {
            cache: Some(&mut cache),
            scenes: None,
        };
        provider.unload_dependencies(&mut ctx, &hero).unwrap();
    }
    assert!(cache.loaded_bundles().is_empty());
    assert_eq!(store.unloads(), vec!["chars", "shared"]);
}

#[test]
fn test_bundle_asset_read_after_closure() {
    let store = Rc::new(FakeBundleStore::manual());
    let mut cache = BundleCache::new(
        bundle_catalog(&[("chars", &["shared"]), ("shared", &[])]),
        store.clone(),
        PathBuf::from("pkg"),
    );
    let provider = BundleProvider::new(store.clone());
    let mut ctx = ProviderContext {
        cache: Some(&mut cache),
        scenes: None,
    };

    let op = provider.load_asset_async(&mut ctx, &CatalogEntry::bundled("hero", "h", "chars"));
    store.complete("chars");
    assert!(op.poll().is_pending());
    assert!(!store.events().iter().any(|e| e.starts_with("asset:")));

    store.complete("shared");
    assert!(matches!(op.poll(), OpStatus::Done(_)));
}

#[test]
fn test_bundle_sync_load_needs_loaded_closure() {
    let store = Rc::new(FakeBundleStore::manual());
    let mut cache = BundleCache::new(
        bundle_catalog(&[("chars", &[])]),
        store.clone(),
        PathBuf::from("pkg"),
    );
    let provider = BundleProvider::new(store.clone());
    {
        let mut ctx = ProviderContext {
            cache: Some(&mut cache),
            scenes: None,
        };
        let err = provider
            .load_asset(&mut ctx, &CatalogEntry::bundled("hero", "h", "chars"))
            .unwrap_err();
        assert!(err.to_string().contains("still loading"));
    }
    assert_eq!(cache.refcount("chars"), 0);
}

#[test]
fn test_bundle_entry_without_name() {
    let store = Rc::new(FakeBundleStore::default());
    let mut cache = BundleCache::new(bundle_catalog(&[]), store.clone(), PathBuf::from("pkg"));
    let provider = BundleProvider::new(store);
    let mut ctx = ProviderContext {
        cache: Some(&mut cache),
        scenes: None,
    };

    let orphan = CatalogEntry::bundled("orphan", "o", "");
    assert!(matches!(
        provider.load_asset_async(&mut ctx, &orphan).poll(),
        OpStatus::Failed(AddressableError::InvalidLocation { .. })
    ));
    assert!(matches!(
        provider.load_dependencies_async(&mut ctx, &orphan).poll(),
        OpStatus::Failed(AddressableError::InvalidLocation { .. })
    ));
}

#[test]
fn test_bundle_without_cache() {
    let provider = BundleProvider::new(Rc::new(FakeBundleStore::default()));
    let mut ctx = bare_context();
    let err = provider
        .load_asset(&mut ctx, &CatalogEntry::bundled("a", "a", "b"))
        .unwrap_err();
    assert!(matches!(err, AddressableError::NoProvider { .. }));
}

#[test]
fn test_scene_calls_reject_assets() {
    let (_, scenes) = scene_manager(&["Scenes/menu"]);
    let provider = PackagedResourceProvider::new(Rc::new(FakeResourceStore::default()));
    let mut ctx = ProviderContext {
        cache: None,
        scenes: Some(&scenes),
    };
    let asset = CatalogEntry::packaged("menu", "Scenes/menu");

    assert!(!provider.load_scene(&mut ctx, &asset, LoadSceneMode::Single));
    assert!(matches!(
        provider
            .load_scene_async(&mut ctx, &asset, LoadSceneMode::Single)
            .poll(),
        OpStatus::Failed(AddressableError::InvalidScene { .. })
    ));
}

#[test]
fn test_packaged_scene_load_and_unload() {
    let (fake, scenes) = scene_manager(&["Scenes/menu", "Scenes/hud"]);
    let provider = PackagedResourceProvider::new(Rc::new(FakeResourceStore::default()));
    let mut ctx = ProviderContext {
        cache: None,
        scenes: Some(&scenes),
    };
    let menu = CatalogEntry::packaged("menu", "Scenes/menu").as_scene();
    let hud = CatalogEntry::packaged("hud", "Scenes/hud").as_scene();

    assert!(provider.load_scene(&mut ctx, &menu, LoadSceneMode::Single));
    let op = provider.load_scene_async(&mut ctx, &hud, LoadSceneMode::Additive);
    assert_eq!(op.poll(), OpStatus::Done(()));
    assert_eq!(fake.open_scenes(), vec!["Scenes/menu", "Scenes/hud"]);

    assert_eq!(
        provider.unload_scene_async(&mut ctx, &menu).poll(),
        OpStatus::Done(())
    );
    assert!(matches!(
        provider.unload_scene_async(&mut ctx, &menu).poll(),
        OpStatus::Failed(AddressableError::InvalidScene { .. })
    ));
}

#[test]
fn test_unknown_scene_is_invalid_scene() {
    let (_, scenes) = scene_manager(&[]);
    let provider = DirectAssetProvider::new(Rc::new(FakeAssetDatabase::default()));
    let mut ctx = ProviderContext {
        cache: None,
        scenes: Some(&scenes),
    };
    let level = CatalogEntry::direct("level", "Scenes/level").as_scene();
    assert!(matches!(
        provider
            .load_scene_async(&mut ctx, &level, LoadSceneMode::Single)
            .poll(),
        OpStatus::Failed(AddressableError::InvalidScene { .. })
    ));
}

#[test]
fn test_bundle_scene_opens_after_bundle() {
    let store = Rc::new(FakeBundleStore::manual());
    let mut cache = BundleCache::new(
        bundle_catalog(&[("levels", &[])]),
        store.clone(),
        PathBuf::from("pkg"),
    );
    let (fake, scenes) = scene_manager(&["Levels/forest"]);
    let provider = AnyProvider::Bundle(BundleProvider::new(store.clone()));
    let forest = CatalogEntry::bundled("forest", "Levels/forest", "levels").as_scene();

    {
        let mut ctx = ProviderContext {
            cache: Some(&mut cache),
            scenes: Some(&scenes),
        };
        let op = provider.load_scene_async(&mut ctx, &forest, LoadSceneMode::Single);
        assert!(op.poll().is_pending());
        assert!(fake.open_scenes().is_empty());

        store.complete("levels");
        assert_eq!(op.poll(), OpStatus::Done(()));
        assert_eq!(fake.open_scenes(), vec!["Levels/forest"]);
    }
    assert_eq!(cache.refcount("levels"), 1);
}

#[test]
fn test_any_provider_location() {
    let direct = AnyProvider::Direct(DirectAssetProvider::new(Rc::new(
        FakeAssetDatabase::default(),
    )));
    let packaged = AnyProvider::Packaged(PackagedResourceProvider::new(Rc::new(
        FakeResourceStore::default(),
    )));
    let bundle = AnyProvider::Bundle(BundleProvider::new(Rc::new(FakeBundleStore::default())));
    assert_eq!(direct.location(), LocationType::DirectAsset);
    assert_eq!(packaged.location(), LocationType::PackagedResource);
    assert_eq!(bundle.location(), LocationType::Bundle);
}
