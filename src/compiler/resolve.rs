//! Physical key resolution for the compiler

use std::path::{Path, PathBuf};

use crate::common::fs::to_forward_slashes;
use crate::domain::Platform;

/// Maps a physical key to the asset file it names
pub trait KeyResolver {
    /// The asset path, relative to the asset root, or `None` if the key
    /// resolves to nothing on `platform`
    fn resolve(&self, key: &str, platform: Platform) -> Option<String>;
}

impl<F> KeyResolver for F
where
    F: Fn(&str, Platform) -> Option<String>,
{
    fn resolve(&self, key: &str, platform: Platform) -> Option<String> {
        self(key, platform)
    }
}

/// Resolves keys against files under an asset root
///
/// A platform override at `<root>/<platform>/<key>` wins over the shared
/// `<root>/<key>`.
#[derive(Debug, Clone)]
pub struct DirectoryKeyResolver {
    root: PathBuf,
}

impl DirectoryKeyResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl KeyResolver for DirectoryKeyResolver {
    fn resolve(&self, key: &str, platform: Platform) -> Option<String> {
        let key = key.trim().trim_start_matches('/');
        if key.is_empty() || key.split('/').any(|part| part == "..") {
            return None;
        }
        [Path::new(platform.as_str()).join(key), PathBuf::from(key)]
            .into_iter()
            .find(|relative| self.root.join(relative).is_file())
            .map(|relative| to_forward_slashes(&relative))
    }
}
