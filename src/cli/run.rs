use clap::Parser;
use std::path::PathBuf;

/// Arguments for the run command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Run a configuration:\n    catminer run miner.yaml\n\n\
                  Provide required parameters:\n    catminer run miner.yaml -p \"@inputdir:/data@outputdir:/tmp\"\n\n\
                  Load globals from a file and write a report:\n    catminer run miner.yaml -g globals.yaml --report stages.json")]
pub struct RunArgs {
    /// Miner configuration file (YAML or JSON)
    pub config: PathBuf,

    /// YAML file of global keywords
    #[arg(long, short = 'g')]
    pub globals: Option<PathBuf>,

    /// Parameters as "@key:value@key:value"; these override --globals
    #[arg(long, short = 'p', allow_hyphen_values = true)]
    pub parameters: Option<String>,

    /// Write a JSON report of every stage to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}
