//! Build pipeline
//!
//! Ordered stages turning a design catalog into shippable artifacts:
//!
//! 1. `clear` - remove the platform's build and dist directories
//! 2. `customize` - apply the project's customize rules to the design catalog
//! 3. `compile` - compile the runtime catalog, bundle assignment and scenes
//! 4. `build` - package the assigned assets into bundles and a manifest
//! 5. `partition` - split produced bundles into local and remote
//! 6. `distribute` - copy the client package and the upload set into dist
//!
//! Every stage reads only what earlier stages wrote to disk (see
//! [`layout`]), so each can be rerun on its own. Running a stage twice
//! produces the same artifacts.

pub mod build;
pub mod compile;
pub mod customize;
pub mod distribute;
pub mod layout;
pub mod partition;

use std::fmt;
use std::path::{Path, PathBuf};

pub use build::{ArchivePackager, CommandPackager, PackageRequest, Packager};
pub use layout::BuildLayout;

use crate::common::fs as common_fs;
use crate::config::ProjectConfig;
use crate::domain::Platform;
use crate::error::Result;

/// One pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Clear,
    Customize,
    Compile,
    Build,
    Partition,
    Distribute,
}

impl Stage {
    /// Every stage, in run order
    pub const ALL: [Stage; 6] = [
        Stage::Clear,
        Stage::Customize,
        Stage::Compile,
        Stage::Build,
        Stage::Partition,
        Stage::Distribute,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Clear => "clear",
            Stage::Customize => "customize",
            Stage::Compile => "compile",
            Stage::Build => "build",
            Stage::Partition => "partition",
            Stage::Distribute => "distribute",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a stage did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub summary: String,
    /// Non-fatal findings, already logged
    pub warnings: Vec<String>,
}

impl StageReport {
    fn new(stage: Stage, summary: impl Into<String>) -> Self {
        Self {
            stage,
            summary: summary.into(),
            warnings: Vec::new(),
        }
    }

    fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// A project's pipeline for one platform
#[derive(Debug, Clone)]
pub struct Pipeline {
    project_dir: PathBuf,
    config: ProjectConfig,
    platform: Platform,
    layout: BuildLayout,
}

impl Pipeline {
    pub fn new(project_dir: impl Into<PathBuf>, config: ProjectConfig, platform: Platform) -> Self {
        let project_dir = project_dir.into();
        let layout = BuildLayout::new(&project_dir, &config, platform);
        Self {
            project_dir,
            config,
            platform,
            layout,
        }
    }

    /// Load `addressable.yaml` from `project_dir`
    ///
    /// An explicit platform overrides the configured default.
    pub fn open(project_dir: &Path, platform: Option<Platform>) -> Result<Self> {
        let config = ProjectConfig::load(project_dir)?;
        let platform = config.resolve_platform(platform)?;
        Ok(Self::new(project_dir, config, platform))
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    /// Run a single stage
    pub fn run(&self, stage: Stage) -> Result<StageReport> {
        log::info!("Running stage '{stage}' for {}", self.platform);
        let report = match stage {
            Stage::Clear => self.clear(),
            Stage::Customize => customize::run(self),
            Stage::Compile => compile::run(self),
            Stage::Build => build::run(self),
            Stage::Partition => partition::run(self),
            Stage::Distribute => distribute::run(self),
        }?;
        log::info!("Stage '{stage}': {}", report.summary);
        Ok(report)
    }

    /// Run every stage in order, stopping at the first failure
    pub fn run_all(&self) -> Result<Vec<StageReport>> {
        Stage::ALL.into_iter().map(|stage| self.run(stage)).collect()
    }

    fn clear(&self) -> Result<StageReport> {
        let removed_build = common_fs::remove_dir_if_exists(self.layout.build_dir())?;
        let removed_dist = common_fs::remove_dir_if_exists(self.layout.dist_dir())?;
        let summary = if removed_build || removed_dist {
            format!("removed {} artifacts", self.platform)
        } else {
            String::from("nothing to clear")
        };
        Ok(StageReport::new(Stage::Clear, summary))
    }
}
