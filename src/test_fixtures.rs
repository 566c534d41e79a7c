//! In-memory engine collaborators for unit tests.
//!
//! Every fake records what it was asked to do so tests can assert on the
//! exact sequence of physical loads and unloads.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{FakeBundleStore, bundle_catalog};
//!
//! let store = Rc::new(FakeBundleStore::default());
//! let catalog = bundle_catalog(&[("A", &["B"]), ("B", &[])]);
//! let mut cache = BundleCache::new(catalog, store.clone(), PathBuf::from("pkg"));
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::config::{BundleCatalog, BundleInfo, BundleLocation};
use crate::domain::Resource;
use crate::error::provider_failure;
use crate::operation::{AsyncOp, OpStatus};
use crate::store::{
    AssetDatabase, BundleStore, Downloader, LoadSceneMode, ResourceStore, SceneManager,
};

/// Bundle catalog with every bundle local
pub fn bundle_catalog(bundles: &[(&str, &[&str])]) -> BundleCatalog {
    bundle_catalog_with(
        &bundles
            .iter()
            .map(|(name, deps)| (*name, *deps, BundleLocation::Local))
            .collect::<Vec<_>>(),
    )
}

/// Bundle catalog with explicit locations
pub fn bundle_catalog_with(bundles: &[(&str, &[&str], BundleLocation)]) -> BundleCatalog {
    let mut catalog = BundleCatalog::default();
    for (name, deps, location) in bundles {
        catalog.bundles.insert(
            (*name).to_string(),
            BundleInfo {
                dependencies: deps.iter().map(|d| (*d).to_string()).collect(),
                location: *location,
                file: format!("{name}.bundle"),
                hash: String::from("blake3:00"),
                size: 1,
            },
        );
    }
    catalog
}

/// Operation that settles with `value` once `gate` is opened
fn gated<T: Clone + 'static>(gate: Rc<Cell<bool>>, value: T) -> AsyncOp<T> {
    AsyncOp::wrap(move || {
        if gate.get() {
            OpStatus::Done(value.clone())
        } else {
            OpStatus::Pending
        }
    })
}

/// Engine bundle object handed out by [`FakeBundleStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeBundle {
    pub name: String,
    pub path: PathBuf,
}

/// Engine asset object handed out by the fakes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeAsset(pub String);

#[derive(Default)]
pub struct FakeBundleStore {
    events: RefCell<Vec<String>>,
    /// When set, bundle loads stay pending until `complete` is called
    manual: Cell<bool>,
    gates: RefCell<BTreeMap<String, Rc<Cell<bool>>>>,
    broken: RefCell<BTreeSet<String>>,
    missing_assets: RefCell<BTreeSet<String>>,
}

impl FakeBundleStore {
    pub fn manual() -> Self {
        let store = Self::default();
        store.manual.set(true);
        store
    }

    /// Finish the pending physical load of `name`
    pub fn complete(&self, name: &str) {
        if let Some(gate) = self.gates.borrow().get(name) {
            gate.set(true);
        }
    }

    pub fn complete_all(&self) {
        for gate in self.gates.borrow().values() {
            gate.set(true);
        }
    }

    /// Make loads of `name` fail
    pub fn break_bundle(&self, name: &str) {
        self.broken.borrow_mut().insert(name.to_string());
    }

    pub fn remove_asset(&self, asset_name: &str) {
        self.missing_assets.borrow_mut().insert(asset_name.to_string());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn loads(&self) -> Vec<String> {
        self.with_prefix("load:")
    }

    pub fn unloads(&self) -> Vec<String> {
        self.with_prefix("unload:")
    }

    fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| e.strip_prefix(prefix).map(str::to_string))
            .collect()
    }
}

impl BundleStore for FakeBundleStore {
    fn load_bundle(&self, name: &str, path: &Path) -> AsyncOp<Resource> {
        self.events.borrow_mut().push(format!("load:{name}"));
        if self.broken.borrow().contains(name) {
            return AsyncOp::failed(provider_failure(name, "corrupt bundle"));
        }
        let bundle = Resource::new(FakeBundle {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
        if self.manual.get() {
            let gate = Rc::new(Cell::new(false));
            self.gates
                .borrow_mut()
                .insert(name.to_string(), Rc::clone(&gate));
            gated(gate, bundle)
        } else {
            AsyncOp::immediate(bundle)
        }
    }

    fn unload_bundle(&self, name: &str, _bundle: &Resource) {
        self.events.borrow_mut().push(format!("unload:{name}"));
    }

    fn load_asset(&self, bundle: &Resource, asset_name: &str) -> AsyncOp<Resource> {
        let bundle_name = bundle
            .downcast_ref::<FakeBundle>()
            .map(|b| b.name.clone())
            .unwrap_or_default();
        self.events
            .borrow_mut()
            .push(format!("asset:{bundle_name}/{asset_name}"));
        if self.missing_assets.borrow().contains(asset_name) {
            return AsyncOp::failed(provider_failure(asset_name, "not in bundle"));
        }
        AsyncOp::immediate(Resource::new(FakeAsset(format!(
            "{bundle_name}/{asset_name}"
        ))))
    }
}

/// Downloader that "fetches" into a fixed directory
pub struct FakeDownloader {
    pub dir: PathBuf,
    fetched: RefCell<Vec<String>>,
}

impl FakeDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            fetched: RefCell::new(Vec::new()),
        }
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl Downloader for FakeDownloader {
    fn fetch(&self, name: &str, info: &BundleInfo) -> AsyncOp<PathBuf> {
        self.fetched.borrow_mut().push(name.to_string());
        AsyncOp::immediate(self.dir.join(&info.file))
    }
}

#[derive(Default)]
pub struct FakeResourceStore {
    resources: BTreeSet<String>,
    lookups: Cell<usize>,
    /// When set, async loads stay pending until `complete_all`
    manual: Cell<bool>,
    gates: RefCell<Vec<Rc<Cell<bool>>>>,
}

impl FakeResourceStore {
    pub fn with(paths: &[&str]) -> Self {
        Self {
            resources: paths.iter().map(|p| (*p).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn manual(self) -> Self {
        self.manual.set(true);
        self
    }

    pub fn complete_all(&self) {
        for gate in self.gates.borrow().iter() {
            gate.set(true);
        }
    }

    /// How many times the store was consulted
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl ResourceStore for FakeResourceStore {
    fn load(&self, path: &str) -> Option<Resource> {
        self.lookups.set(self.lookups.get() + 1);
        self.resources
            .contains(path)
            .then(|| Resource::new(FakeAsset(path.to_string())))
    }

    fn load_async(&self, path: &str) -> AsyncOp<Option<Resource>> {
        let result = self.load(path);
        if self.manual.get() {
            let gate = Rc::new(Cell::new(false));
            self.gates.borrow_mut().push(Rc::clone(&gate));
            gated(gate, result)
        } else {
            AsyncOp::immediate(result)
        }
    }
}

#[derive(Default)]
pub struct FakeAssetDatabase {
    assets: BTreeSet<String>,
}

impl FakeAssetDatabase {
    pub fn with(keys: &[&str]) -> Self {
        Self {
            assets: keys.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

impl AssetDatabase for FakeAssetDatabase {
    fn load_by_key(&self, key: &str) -> Option<Resource> {
        self.assets
            .contains(key)
            .then(|| Resource::new(FakeAsset(key.to_string())))
    }
}

#[derive(Default)]
pub struct FakeSceneManager {
    scenes: BTreeSet<String>,
    open: RefCell<Vec<String>>,
}

impl FakeSceneManager {
    pub fn with(scenes: &[&str]) -> Self {
        Self {
            scenes: scenes.iter().map(|s| (*s).to_string()).collect(),
            open: RefCell::new(Vec::new()),
        }
    }

    pub fn open_scenes(&self) -> Vec<String> {
        self.open.borrow().clone()
    }

    fn open(&self, scene: &str, mode: LoadSceneMode) -> bool {
        if !self.scenes.contains(scene) {
            return false;
        }
        let mut open = self.open.borrow_mut();
        if mode == LoadSceneMode::Single {
            open.clear();
        }
        open.push(scene.to_string());
        true
    }
}

impl SceneManager for FakeSceneManager {
    fn load_scene(&self, scene: &str, mode: LoadSceneMode) -> bool {
        self.open(scene, mode)
    }

    fn load_scene_async(&self, scene: &str, mode: LoadSceneMode) -> AsyncOp<()> {
        if self.open(scene, mode) {
            AsyncOp::immediate(())
        } else {
            AsyncOp::failed(provider_failure(scene, "scene not in build"))
        }
    }

    fn unload_scene_async(&self, scene: &str) -> AsyncOp<()> {
        let mut open = self.open.borrow_mut();
        match open.iter().position(|s| s == scene) {
            Some(index) => {
                open.remove(index);
                AsyncOp::immediate(())
            }
            None => AsyncOp::failed(provider_failure(scene, "scene not open")),
        }
    }
}
