use clap::Parser;

use crate::domain::Platform;

/// Arguments shared by the pipeline stage commands
#[derive(Parser, Debug, Default)]
#[command(after_help = "EXAMPLES:\n  \
                  Run the stage for the configured platform:\n    addressable compile\n\n\
                  Run the stage for another platform:\n    addressable compile --platform webgl")]
pub struct StageArgs {
    /// Target platform (defaults to `platform` in addressable.yaml)
    #[arg(long, value_enum)]
    pub platform: Option<Platform>,
}
