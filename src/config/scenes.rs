//! Always-loaded scene list (scenes.json)
//!
//! Scenes compiled into the player package must be listed here; scenes
//! shipped in bundles are loaded on demand and must not be. The compiler
//! emits a [`SceneListDelta`] that the compile stage applies to the list.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::fs as common_fs;
use crate::error::{Result, config_parse_failed};

pub const SCENES_FILE: &str = "scenes.json";

/// Scenes to add to and remove from the always-loaded list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneListDelta {
    #[serde(default)]
    pub add: BTreeSet<String>,
    #[serde(default)]
    pub remove: BTreeSet<String>,
}

impl SceneListDelta {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Scene list structure (scenes.json); order is load order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneList {
    #[serde(default)]
    pub scenes: Vec<String>,
}

impl SceneList {
    /// Read the list, treating a missing file as empty
    pub fn read_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = common_fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        common_fs::write_atomic(path, json.as_bytes())
    }

    /// Apply a delta, keeping the order of scenes already listed
    ///
    /// New scenes are appended in name order. Returns whether the list
    /// changed, so applying the same delta twice is a no-op.
    pub fn apply(&mut self, delta: &SceneListDelta) -> bool {
        let before = self.scenes.len();
        self.scenes.retain(|s| !delta.remove.contains(s));
        let mut changed = self.scenes.len() != before;

        for scene in &delta.add {
            if !self.scenes.contains(scene) {
                self.scenes.push(scene.clone());
                changed = true;
            }
        }
        changed
    }

    pub fn contains(&self, scene: &str) -> bool {
        self.scenes.iter().any(|s| s == scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(add: &[&str], remove: &[&str]) -> SceneListDelta {
        SceneListDelta {
            add: add.iter().map(|s| (*s).to_string()).collect(),
            remove: remove.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn test_apply_adds_and_removes() {
        let mut list = SceneList {
            scenes: vec!["Scenes/boot".to_string(), "Scenes/level1".to_string()],
        };
        let changed = list.apply(&delta(&["Scenes/menu"], &["Scenes/level1"]));
        assert!(changed);
        assert_eq!(list.scenes, vec!["Scenes/boot", "Scenes/menu"]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut list = SceneList::default();
        let d = delta(&["a", "b"], &["c"]);
        assert!(list.apply(&d));
        assert!(!list.apply(&d));
        assert_eq!(list.scenes, vec!["a", "b"]);
    }

    #[test]
    fn test_read_missing_is_empty() {
        let temp = tempfile::TempDir::new().unwrap();
        let list = SceneList::read_or_default(&temp.path().join(SCENES_FILE)).unwrap();
        assert!(list.scenes.is_empty());
    }
}
