//! Build stage
//!
//! Packages the compiled bundle assignment into bundle files. The packaging
//! tool is external: a project either names a command in
//! `packager.command`, or falls back to the built-in [`ArchivePackager`].
//! Whichever runs must leave `manifest.json` next to the bundles it wrote.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::Command;

use super::compile::{BundleAssignment, read_assignment};
use super::{BuildLayout, Pipeline, Stage, StageReport};
use crate::common::fs as common_fs;
use crate::config::Manifest;
use crate::config::manifest::MANIFEST_FILE;
use crate::domain::Platform;
use crate::error::{AddressableError, Result, file_read_failed};

/// Everything a packager needs for one run
#[derive(Debug, Clone, Copy)]
pub struct PackageRequest<'a> {
    pub platform: Platform,
    /// Asset paths in the assignment are relative to this directory
    pub asset_root: &'a Path,
    pub assignment: &'a BundleAssignment,
    /// The assignment as written by the compile stage
    pub assignment_file: &'a Path,
    /// Where bundle files and `manifest.json` go
    pub output_dir: &'a Path,
}

/// The packaging step
pub trait Packager {
    fn package(&self, request: &PackageRequest<'_>) -> Result<()>;
}

fn packaging_failed(message: impl Into<String>) -> AddressableError {
    AddressableError::PackagingFailed {
        message: message.into(),
    }
}

/// Runs the project's packaging tool
///
/// `{platform}`, `{input}` and `{output}` in the arguments are replaced with
/// the platform name, the assignment file and the output directory.
#[derive(Debug, Clone)]
pub struct CommandPackager {
    command: Vec<String>,
}

impl CommandPackager {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    fn expand(&self, request: &PackageRequest<'_>) -> Vec<String> {
        let input = request.assignment_file.display().to_string();
        let output = request.output_dir.display().to_string();
        self.command
            .iter()
            .map(|arg| {
                arg.replace("{platform}", request.platform.as_str())
                    .replace("{input}", &input)
                    .replace("{output}", &output)
            })
            .collect()
    }
}

impl Packager for CommandPackager {
    fn package(&self, request: &PackageRequest<'_>) -> Result<()> {
        let args = self.expand(request);
        let Some((program, rest)) = args.split_first() else {
            return Err(packaging_failed("packager command is empty"));
        };
        log::debug!("Running packager: {}", args.join(" "));
        let status = Command::new(program)
            .args(rest)
            .current_dir(request.asset_root)
            .status()
            .map_err(|e| packaging_failed(format!("cannot run '{program}': {e}")))?;
        if !status.success() {
            return Err(packaging_failed(format!("'{program}' exited with {status}")));
        }
        Ok(())
    }
}

/// Built-in packager writing one flat archive per bundle
///
/// Each archive is the concatenation of its asset files, each preceded by a
/// `<path>\n<length>\n` header. Bundle dependencies come from
/// `packager.dependencies` in the project configuration.
#[derive(Debug, Clone, Default)]
pub struct ArchivePackager {
    dependencies: BTreeMap<String, Vec<String>>,
}

impl ArchivePackager {
    pub fn new(dependencies: BTreeMap<String, Vec<String>>) -> Self {
        Self { dependencies }
    }

    fn archive(asset_root: &Path, paths: &[String]) -> Result<Vec<u8>> {
        let mut archive = Vec::new();
        for relative in paths {
            let path = asset_root.join(relative);
            let content = fs::read(&path).map_err(|e| file_read_failed(&path, e))?;
            archive.extend_from_slice(format!("{relative}\n{}\n", content.len()).as_bytes());
            archive.extend_from_slice(&content);
        }
        Ok(archive)
    }
}

impl Packager for ArchivePackager {
    fn package(&self, request: &PackageRequest<'_>) -> Result<()> {
        let mut manifest = Manifest::new();
        for (bundle, paths) in request.assignment {
            let file = format!("{bundle}.bundle");
            let archive = Self::archive(request.asset_root, paths)?;
            common_fs::write_atomic(&request.output_dir.join(&file), &archive)?;
            let dependencies = self.dependencies.get(bundle).cloned().unwrap_or_default();
            manifest.insert(bundle.as_str(), dependencies, file);
        }
        manifest.write(&request.output_dir.join(MANIFEST_FILE))
    }
}

pub(super) fn run(pipeline: &Pipeline) -> Result<StageReport> {
    let layout = pipeline.layout();
    let assignment_file = BuildLayout::require(Stage::Build, layout.assignment())?;
    let assignment = read_assignment(&assignment_file)?;

    let output_dir = layout.bundles_dir();
    common_fs::remove_dir_if_exists(&output_dir)?;
    fs::create_dir_all(&output_dir)?;

    let asset_root = pipeline.project_dir().join(&pipeline.config().asset_root);
    let request = PackageRequest {
        platform: pipeline.platform(),
        asset_root: &asset_root,
        assignment: &assignment,
        assignment_file: &assignment_file,
        output_dir: &output_dir,
    };
    let packager: Box<dyn Packager> = match &pipeline.config().packager.command {
        Some(command) => Box::new(CommandPackager::new(command.clone())),
        None => Box::new(ArchivePackager::new(
            pipeline.config().packager.dependencies.clone(),
        )),
    };
    packager.package(&request)?;

    let manifest_path = layout.manifest();
    if !manifest_path.is_file() {
        return Err(packaging_failed(format!(
            "the packager did not write {MANIFEST_FILE}"
        )));
    }
    let manifest = Manifest::read(&manifest_path)?;
    manifest.graph().validate()?;

    Ok(StageReport::new(
        Stage::Build,
        format!("{} bundles packaged", manifest.bundles.len()),
    ))
}
