//! catminer - configuration-driven record mining
//!
//! Loads catalog records, runs them through configured strategies and
//! exports the selected fields.

use clap::Parser;

use catminer::cli::{Cli, Commands};
use catminer::commands;
use catminer::logging::setup_tracing;

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.quiet),
        Commands::Types => commands::types::run(),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
