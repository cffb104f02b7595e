//! Shell completions command

use std::fs;
use std::io::Write;

use clap::CommandFactory;

use crate::cli::{Cli, CompletionsArgs};
use crate::error::{self, Result};

/// Completion script for `catminer` in the given shell
fn script(shell: clap_complete::Shell) -> Vec<u8> {
    let mut buffer = Vec::new();
    clap_complete::generate(shell, &mut Cli::command(), "catminer", &mut buffer);
    buffer
}

/// Generate shell completions to stdout or `--output`
pub fn run(args: CompletionsArgs) -> Result<()> {
    let script = script(args.shell);
    match &args.output {
        Some(path) => {
            fs::write(path, &script).map_err(|e| error::file_write_failed(path.display().to_string(), e.to_string()))?;
            tracing::info!(shell = %args.shell, path = %path.display(), "wrote completions");
        }
        None => std::io::stdout().lock().write_all(&script)?,
    }
    Ok(())
}
