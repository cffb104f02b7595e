//! CLI definitions using clap derive API
//!
//! Argument types for each command live in submodules:
//! - run: Run command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};

pub mod completions;
pub mod run;

pub use completions::CompletionsArgs;
pub use run::RunArgs;

/// catminer - configuration-driven catalog mining
#[derive(Parser, Debug)]
#[command(
    name = "catminer",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Mine planetary catalog records through configured strategies",
    long_about = "catminer loads catalog records, runs them through an ordered list of \
                  strategies (filters, limits, calculators, sidebars, GIS overlaps and \
                  stereo pairing) and exports the selected fields.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  catminer run miner.yaml                               \x1b[90m# Run a configuration\x1b[0m\n   \
                  catminer run miner.yaml -p \"@inputdir:/data\"          \x1b[90m# Provide parameters\x1b[0m\n   \
                  catminer run miner.yaml --report stages.json          \x1b[90m# Write a stage report\x1b[0m\n   \
                  catminer types                                        \x1b[90m# List strategy types\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Suppress progress and summary output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a miner configuration
    Run(RunArgs),

    /// List the available strategy types
    Types,

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parsing_run() {
        let cli = Cli::try_parse_from(["catminer", "run", "miner.yaml"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("miner.yaml"));
                assert!(args.globals.is_none());
                assert!(args.parameters.is_none());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parsing_run_options() {
        let cli = Cli::try_parse_from([
            "catminer",
            "run",
            "miner.yaml",
            "--globals",
            "globals.yaml",
            "-p",
            "@inputdir:/data",
            "--report",
            "report.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.globals, Some(PathBuf::from("globals.yaml")));
                assert_eq!(args.parameters.as_deref(), Some("@inputdir:/data"));
                assert_eq!(args.report, Some(PathBuf::from("report.json")));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parsing_types() {
        let cli = Cli::try_parse_from(["catminer", "types"]).unwrap();
        assert!(matches!(cli.command, Commands::Types));
    }

    #[test]
    fn test_cli_parsing_version() {
        let cli = Cli::try_parse_from(["catminer", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from(["catminer", "-v", "types"]).unwrap();
        assert!(cli.verbose);

        let cli = Cli::try_parse_from(["catminer", "run", "m.yaml", "--quiet"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["catminer", "-v", "-q", "types"]).is_err());
    }

    #[test]
    fn test_cli_parsing_completions() {
        let cli = Cli::try_parse_from(["catminer", "completions", "bash"]).unwrap();
        match cli.command {
            Commands::Completions(args) => {
                assert_eq!(args.shell, clap_complete::Shell::Bash);
                assert!(args.output.is_none());
            }
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_completions_rejects_unsupported_shell() {
        assert!(Cli::try_parse_from(["catminer", "completions", "tcsh"]).is_err());
    }
}
