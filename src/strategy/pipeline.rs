//! Ordered strategy execution

use serde::Serialize;

use super::{BuildContext, Strategy};
use crate::config::{Definition, Globals};
use crate::error::Result;
use crate::resource::ResourceList;
use crate::ui::{ProgressReporter, SilentProgressReporter};

/// Counts recorded after one stage ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Active resources when the stage started
    pub processed: usize,
    /// What the stage itself reported
    pub result: usize,
    pub active: usize,
    pub total: usize,
}

/// Strategies applied in sequence to one shared list
#[derive(Debug, Default)]
pub struct Pipeline {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Pipeline {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    pub fn from_definitions(definitions: &[Definition], ctx: &BuildContext<'_>) -> Result<Self> {
        Ok(Self::new(ctx.registry.create_all(definitions, ctx)?))
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn strategies(&self) -> &[Box<dyn Strategy>] {
        &self.strategies
    }

    /// Runs every stage without progress output
    pub fn run(&self, resources: &mut ResourceList, globals: &Globals) -> Result<Vec<StageReport>> {
        self.run_with_progress(resources, globals, &mut SilentProgressReporter)
    }

    /// Runs every stage; the first failure aborts the run
    pub fn run_with_progress(
        &self,
        resources: &mut ResourceList,
        globals: &Globals,
        progress: &mut dyn ProgressReporter,
    ) -> Result<Vec<StageReport>> {
        let mut reports = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            progress.start_stage(strategy.name(), strategy.kind());
            let processed = resources.active_count();

            let result = match strategy.apply(resources, globals) {
                Ok(result) => result,
                Err(e) => {
                    progress.abandon();
                    return Err(e);
                }
            };

            let report = StageReport {
                name: strategy.name().to_string(),
                kind: strategy.kind().to_string(),
                processed,
                result,
                active: resources.active_count(),
                total: resources.len(),
            };
            tracing::info!(
                strategy = %report.name,
                kind = %report.kind,
                processed = report.processed,
                result = report.result,
                active = report.active,
                total = report.total,
                "stage complete"
            );
            reports.push(report);
            progress.finish_stage();
        }

        progress.finish();
        Ok(reports)
    }
}
