//! On-disk layout of build artifacts
//!
//! ```text
//! <project>/<build_dir>/<platform>/
//!     catalog.customized.yaml   customize
//!     catalog.json              compile
//!     assignment.json           compile
//!     scenes.json               compile
//!     bundles/                  build (bundle files + manifest.json)
//!     bundle_catalog.json       partition
//!     downloadables.json        partition
//! <project>/<dist_dir>/<platform>/
//!     package/                  distribute: shipped with the client
//!     upload/                   distribute: remote bundles for the CDN
//! ```

use std::path::{Path, PathBuf};

use super::Stage;
use crate::config::ProjectConfig;
use crate::config::bundle_catalog::BUNDLE_CATALOG_FILE;
use crate::config::downloadables::DOWNLOADABLES_FILE;
use crate::config::manifest::MANIFEST_FILE;
use crate::config::scenes::SCENES_FILE;
use crate::domain::Platform;
use crate::error::{Result, stage_input_missing};

pub const CUSTOMIZED_CATALOG_FILE: &str = "catalog.customized.yaml";
pub const RUNTIME_CATALOG_FILE: &str = "catalog.json";
pub const ASSIGNMENT_FILE: &str = "assignment.json";

/// Paths of every artifact for one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    build_dir: PathBuf,
    dist_dir: PathBuf,
}

impl BuildLayout {
    pub fn new(project_dir: &Path, config: &ProjectConfig, platform: Platform) -> Self {
        Self {
            build_dir: project_dir.join(&config.build_dir).join(platform.as_str()),
            dist_dir: project_dir.join(&config.dist_dir).join(platform.as_str()),
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn dist_dir(&self) -> &Path {
        &self.dist_dir
    }

    pub fn customized_catalog(&self) -> PathBuf {
        self.build_dir.join(CUSTOMIZED_CATALOG_FILE)
    }

    pub fn runtime_catalog(&self) -> PathBuf {
        self.build_dir.join(RUNTIME_CATALOG_FILE)
    }

    pub fn assignment(&self) -> PathBuf {
        self.build_dir.join(ASSIGNMENT_FILE)
    }

    pub fn scenes(&self) -> PathBuf {
        self.build_dir.join(SCENES_FILE)
    }

    pub fn bundles_dir(&self) -> PathBuf {
        self.build_dir.join("bundles")
    }

    pub fn manifest(&self) -> PathBuf {
        self.bundles_dir().join(MANIFEST_FILE)
    }

    pub fn bundle_catalog(&self) -> PathBuf {
        self.build_dir.join(BUNDLE_CATALOG_FILE)
    }

    pub fn downloadables(&self) -> PathBuf {
        self.build_dir.join(DOWNLOADABLES_FILE)
    }

    pub fn package_dir(&self) -> PathBuf {
        self.dist_dir.join("package")
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.dist_dir.join("upload")
    }

    /// `path`, if an earlier stage produced it
    ///
    /// # Errors
    ///
    /// `StageInputMissing` naming `stage` and the missing file.
    pub fn require(stage: Stage, path: PathBuf) -> Result<PathBuf> {
        if path.is_file() {
            Ok(path)
        } else {
            Err(stage_input_missing(
                stage.as_str(),
                path.display().to_string(),
            ))
        }
    }
}
