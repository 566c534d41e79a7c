//! CLI definitions using clap derive API
//!
//! Argument types live in submodules:
//! - stage: arguments shared by the pipeline stage commands
//! - inspect: Inspect command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod inspect;
pub mod stage;

pub use completions::CompletionsArgs;
pub use inspect::InspectArgs;
pub use stage::StageArgs;

/// Addressable - asset catalog and bundle build tool
#[derive(Parser, Debug)]
#[command(
    name = "addressable",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Compile asset catalogs and partition bundles into local and remote sets",
    long_about = "Addressable compiles a design-time asset catalog into a runtime catalog, \
                  packages bundles, splits them into ones shipped with the client and ones \
                  downloaded on demand, and lays out the result for distribution.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  addressable all                        \x1b[90m# Run every stage for the default platform\x1b[0m\n   \
                  addressable compile --platform ios     \x1b[90m# Recompile the catalog for iOS\x1b[0m\n   \
                  addressable partition                  \x1b[90m# Split bundles into local and remote\x1b[0m\n   \
                  addressable inspect --detailed         \x1b[90m# Show what the last build produced\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Project directory holding addressable.yaml (defaults to current directory)
    #[arg(long, short = 'p', global = true, env = "ADDRESSABLE_PROJECT")]
    pub project: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove the platform's build and dist directories
    Clear(StageArgs),

    /// Apply customize rules to the design catalog
    Customize(StageArgs),

    /// Compile the runtime catalog, bundle assignment and scene list
    Compile(StageArgs),

    /// Package assigned assets into bundles
    Build(StageArgs),

    /// Split produced bundles into local and remote sets
    Partition(StageArgs),

    /// Copy the client package and upload set into the dist directory
    Distribute(StageArgs),

    /// Run every stage in order
    All(StageArgs),

    /// Show the artifacts of the last build
    Inspect(InspectArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
