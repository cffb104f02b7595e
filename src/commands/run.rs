//! Run command implementation
//!
//! Loads a configuration, layers `--globals` and `--parameters` into the
//! outermost scope, checks required parameters and runs the pipeline.

use std::fs;
use std::path::Path;

use crate::cli::RunArgs;
use crate::config::{Globals, MinerConfig, load_globals, parse_parameters};
use crate::error::{self, Result};
use crate::resource::{Attributes, ResourceList};
use crate::strategy::{BuildContext, Pipeline, StageReport, StrategyRegistry};
use crate::ui::{InteractiveProgressReporter, SilentProgressReporter, print_summary};

/// Run a miner configuration
pub fn run(args: RunArgs, quiet: bool) -> Result<()> {
    let config = MinerConfig::load(&args.config)?;
    let globals = Globals::from_attributes(command_globals(&args)?);
    config.validate_parameters(&globals)?;

    let registry = StrategyRegistry::default();
    let ctx = BuildContext::new(&registry, &globals);
    let pipeline = Pipeline::from_definitions(&config.strategies, &ctx)?;
    tracing::info!(config = %config.name, stages = pipeline.len(), "pipeline loaded");

    let mut resources = ResourceList::new();
    let reports = if quiet {
        pipeline.run_with_progress(&mut resources, &globals, &mut SilentProgressReporter)?
    } else {
        let total = u64::try_from(pipeline.len()).unwrap_or(u64::MAX);
        let mut progress = InteractiveProgressReporter::new(total);
        pipeline.run_with_progress(&mut resources, &globals, &mut progress)?
    };

    if !quiet {
        print_summary(&config.name, &reports);
    }
    if let Some(path) = &args.report {
        write_report(path, &reports)?;
    }

    Ok(())
}

/// Globals file first, then command-line parameters on top
fn command_globals(args: &RunArgs) -> Result<Attributes> {
    let mut attributes = match &args.globals {
        Some(path) => load_globals(path)?,
        None => Attributes::new(),
    };
    if let Some(input) = &args.parameters {
        for (key, values) in parse_parameters(input)?.iter() {
            attributes.set_values(key, values.to_vec());
        }
    }
    Ok(attributes)
}

fn write_report(path: &Path, reports: &[StageReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    fs::write(path, json + "\n")
        .map_err(|e| error::file_write_failed(path.display().to_string(), e.to_string()))
}
