use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;

/// Arguments for the completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Print bash completions:\n    catminer completions bash\n\n\
                  Install zsh completions:\n    catminer completions zsh -o ~/.zfunc/_catminer")]
pub struct CompletionsArgs {
    /// Shell to generate the completion script for
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,

    /// Write the script to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}
