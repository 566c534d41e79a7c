use clap::Parser;

use crate::domain::Platform;

/// Arguments for the inspect command
#[derive(Parser, Debug, Default)]
#[command(after_help = "EXAMPLES:\n  \
                  Summarize the last build:\n    addressable inspect\n\n\
                  List every entry and bundle:\n    addressable inspect --detailed\n\n\
                  Inspect another platform's build:\n    addressable inspect --platform ios")]
pub struct InspectArgs {
    /// Platform whose build to inspect (defaults to `platform` in addressable.yaml)
    #[arg(long, value_enum)]
    pub platform: Option<Platform>,

    /// List catalog entries and bundles one by one
    #[arg(long)]
    pub detailed: bool,
}
