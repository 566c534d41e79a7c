//! Addressable command line
//!
//! Runs the build pipeline stages against a project directory holding
//! `addressable.yaml`.

use clap::Parser;
use miette::Diagnostic;

use addressable::cli::{Cli, Commands};
use addressable::commands;
use addressable::pipeline::Stage;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Clear(args) => commands::stage::run(cli.project, Stage::Clear, args),
        Commands::Customize(args) => commands::stage::run(cli.project, Stage::Customize, args),
        Commands::Compile(args) => commands::stage::run(cli.project, Stage::Compile, args),
        Commands::Build(args) => commands::stage::run(cli.project, Stage::Build, args),
        Commands::Partition(args) => commands::stage::run(cli.project, Stage::Partition, args),
        Commands::Distribute(args) => commands::stage::run(cli.project, Stage::Distribute, args),
        Commands::All(args) => commands::stage::run_all(cli.project, args),
        Commands::Inspect(args) => commands::inspect::run(cli.project, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if let Some(help) = e.help() {
            eprintln!("  help: {help}");
        }
        std::process::exit(1);
    }
}
