//! Strategies
//!
//! A strategy is one configured processing stage. It receives the shared
//! resource list and the global keyword scopes, changes attributes and
//! discard flags in place, and reports how many resources it acted on.
//!
//! Strategies are built from [`Definition`]s by the [`StrategyRegistry`] and
//! run in order by a [`Pipeline`].

/// Logs a per-resource decision at `debug`, or `info` when the strategy
/// was configured with `Debug: true`
macro_rules! decision {
    ($info:expr, $($arg:tt)+) => {
        if $info.debug {
            tracing::info!(strategy = %$info.name, $($arg)+)
        } else {
            tracing::debug!(strategy = %$info.name, $($arg)+)
        }
    };
}

mod asset_sidebar;
mod calculator;
mod csv_reader;
mod csv_writer;
mod filter;
mod gis_intersect;
mod gis_overlap;
mod gis_union;
mod import;
mod is_numeric;
mod limit;
mod numerical_sort;
mod pipeline;
mod registry;
mod resource_manager;
mod sidebar;
mod stereo_pair;

pub use asset_sidebar::AssetSidebarStrategy;
pub use calculator::{Calculation, CalculatorStrategy};
pub use csv_reader::CsvReaderStrategy;
pub use csv_writer::CsvWriterStrategy;
pub use filter::FilterStrategy;
pub use gis_intersect::GisIntersectStrategy;
pub use gis_overlap::{GisOverlapStrategy, OverlapMerge};
pub use gis_union::GisUnionStrategy;
pub use is_numeric::IsNumericStrategy;
pub use limit::LimitStrategy;
pub use numerical_sort::{NumericalSortStrategy, SortOrder};
pub use pipeline::{Pipeline, StageReport};
pub use registry::{BuildContext, Constructor, StrategyRegistry, StrategyType};
pub use resource_manager::{Operation, ResourceManagerStrategy};
pub use sidebar::SidebarStrategy;
pub use stereo_pair::{RankWindow, StereoPairStrategy};

use std::fmt;

use crate::config::{Definition, Globals, MinerConfig};
use crate::error::Result;
use crate::resource::{Resource, ResourceList};

/// A configured processing stage
pub trait Strategy: fmt::Debug {
    fn info(&self) -> &StrategyInfo;

    /// Run against the list; returns how many resources the stage acted on
    fn apply(&self, resources: &mut ResourceList, globals: &Globals) -> Result<usize>;

    fn name(&self) -> &str {
        &self.info().name
    }

    fn kind(&self) -> &str {
        &self.info().kind
    }
}

/// Keywords every strategy carries
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyInfo {
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub debug: bool,
}

impl StrategyInfo {
    pub fn new(definition: &Definition, kind: &str) -> Self {
        Self {
            name: definition.get_str("Name").unwrap_or_else(|| kind.to_string()),
            kind: kind.to_string(),
            description: definition.description(),
            debug: definition.is_debug(),
        }
    }
}

/// Builds nested strategies from an inline list or an external file
///
/// `list_key` names an inline list of strategy definitions; `file_key` names
/// a configuration file whose path may use `%N` arguments from
/// `<file_key>Args`. Returns an empty pipeline when neither is present.
pub fn load_nested(
    definition: &Definition,
    list_key: &str,
    file_key: &str,
    ctx: &BuildContext<'_>,
) -> Result<Pipeline> {
    if let Some(items) = definition.sequence(list_key) {
        let definitions = items
            .iter()
            .map(Definition::from_value)
            .collect::<Result<Vec<_>>>()?;
        return Pipeline::from_definitions(&definitions, ctx);
    }

    if let Some(path) = definition.translate(file_key, ctx.globals) {
        let config = MinerConfig::load(std::path::Path::new(&path))?;
        tracing::debug!(path = %path, strategies = config.strategies.len(), "loaded nested configuration");
        return Pipeline::from_definitions(&config.strategies, ctx);
    }

    Ok(Pipeline::default())
}

/// Discards every active resource for which `keep` returns false
///
/// Every decision is made before anything is discarded, so an error from
/// `keep` leaves the list unchanged. Returns how many resources were kept.
pub(crate) fn retain_active<F>(info: &StrategyInfo, resources: &mut ResourceList, mut keep: F) -> Result<usize>
where
    F: FnMut(&Resource) -> Result<bool>,
{
    let decisions = resources
        .active_iter()
        .map(|resource| keep(resource))
        .collect::<Result<Vec<bool>>>()?;
    let mut kept = 0;
    for (resource, keep) in resources.active_iter_mut().zip(decisions) {
        if keep {
            kept += 1;
        } else {
            decision!(info, resource = %resource.identity(), "discarded");
            resource.discard();
        }
    }
    Ok(kept)
}
