//! Common test utilities for Addressable integration tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Design catalog of the sample project
pub const DESIGN_CATALOG: &str = r"
version: 1
local_bundles: [shared]
entries:
  - id: hero
    key: Chars/hero.prefab
    location: packaged_resource
    labels: [character]
  - id: villain
    key: Chars/villain.prefab
    location: packaged_resource
    labels: [character]
  - id: palette
    key: Shared/palette.png
    location: bundle
    bundle_name: shared
  - id: forest
    key: Levels/forest.unity
    location: bundle
    bundle_name: levels
    kind: scene
  - id: menu
    key: Scenes/menu.unity
    location: packaged_resource
    kind: scene
  - id: logo
    key: UI/logo.png
    location: packaged_resource
";

/// Project configuration of the sample project
pub const PROJECT_CONFIG: &str = r"
platform: android
customize:
  - label: character
    bundle: chars
    group: characters
packager:
  dependencies:
    chars: [shared]
    levels: [shared]
";

const ASSETS: [&str; 6] = [
    "Chars/hero.prefab",
    "Chars/villain.prefab",
    "Shared/palette.png",
    "Levels/forest.unity",
    "Scenes/menu.unity",
    "UI/logo.png",
];

/// A test project for integration tests
pub struct TestProject {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to project root
    pub path: PathBuf,
}

impl TestProject {
    /// Create an empty project directory
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Create the sample project: config, design catalog and asset files
    pub fn sample() -> Self {
        Self::with_config(PROJECT_CONFIG)
    }

    /// Create the sample project with a different addressable.yaml
    pub fn with_config(config: &str) -> Self {
        let project = Self::new();
        project.write_file("addressable.yaml", config);
        project.write_file("catalog.yaml", DESIGN_CATALOG);
        for asset in ASSETS {
            project.write_file(&format!("assets/{asset}"), asset);
        }
        project
    }

    /// Write a file in project
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from project
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in project
    #[allow(dead_code)]
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    #[allow(dead_code)]
    pub fn dir(&self) -> &Path {
        &self.path
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
