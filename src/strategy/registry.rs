//! Strategy registry
//!
//! This module provides:
//! - Strategy type registration and case-insensitive lookup by `Type`
//! - Construction of configured strategies (recursively for nested ones)
//! - The default set of strategy types

use std::collections::HashMap;
use std::sync::Arc;

use super::{
    AssetSidebarStrategy, CalculatorStrategy, CsvReaderStrategy, CsvWriterStrategy,
    FilterStrategy, GisIntersectStrategy, GisOverlapStrategy, GisUnionStrategy, IsNumericStrategy,
    LimitStrategy, NumericalSortStrategy, ResourceManagerStrategy, SidebarStrategy,
    StereoPairStrategy, Strategy,
};
use crate::config::{Definition, Globals};
use crate::error::{self, Result};
use crate::geometry::{GeometryProvider, PlanarGeometry};

/// Everything a strategy constructor may need
#[derive(Clone)]
pub struct BuildContext<'a> {
    pub registry: &'a StrategyRegistry,
    /// Globals known at construction time (used for file path arguments)
    pub globals: &'a Globals,
    pub geometry: Arc<dyn GeometryProvider>,
}

impl<'a> BuildContext<'a> {
    pub fn new(registry: &'a StrategyRegistry, globals: &'a Globals) -> Self {
        Self {
            registry,
            globals,
            geometry: Arc::new(PlanarGeometry::new()),
        }
    }

    pub fn with_geometry(mut self, geometry: Arc<dyn GeometryProvider>) -> Self {
        self.geometry = geometry;
        self
    }
}

pub type Constructor = fn(&Definition, &BuildContext<'_>) -> Result<Box<dyn Strategy>>;

/// A registered strategy type
#[derive(Clone)]
pub struct StrategyType {
    pub id: &'static str,
    pub summary: &'static str,
    pub constructor: Constructor,
}

impl StrategyType {
    pub fn new(id: &'static str, summary: &'static str, constructor: Constructor) -> Self {
        Self {
            id,
            summary,
            constructor,
        }
    }
}

/// Registry of all known strategy types
pub struct StrategyRegistry {
    types: Vec<StrategyType>,
    by_id: HashMap<String, usize>,
}

impl StrategyRegistry {
    /// Create a new registry with the given types
    pub fn new(types: Vec<StrategyType>) -> Self {
        let by_id: HashMap<String, usize> = types
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.id.to_lowercase(), idx))
            .collect();

        Self { types, by_id }
    }

    /// Add or replace a strategy type
    pub fn register(&mut self, strategy_type: StrategyType) {
        let key = strategy_type.id.to_lowercase();
        if let Some(&idx) = self.by_id.get(&key) {
            self.types[idx] = strategy_type;
        } else {
            self.by_id.insert(key, self.types.len());
            self.types.push(strategy_type);
        }
    }

    /// Get a type by name, ignoring case
    pub fn get(&self, id: &str) -> Option<&StrategyType> {
        self.by_id
            .get(&id.to_lowercase())
            .and_then(|&idx| self.types.get(idx))
    }

    pub fn all(&self) -> &[StrategyType] {
        &self.types
    }

    /// Build one strategy from its definition
    pub fn create(&self, definition: &Definition, ctx: &BuildContext<'_>) -> Result<Box<dyn Strategy>> {
        let name = definition.name();
        let kind = definition
            .kind()
            .ok_or_else(|| error::missing_type(&name))?;
        let strategy_type = self
            .get(&kind)
            .ok_or_else(|| error::unknown_type(&name, &kind))?;

        tracing::debug!(name = %name, kind = strategy_type.id, "creating strategy");
        (strategy_type.constructor)(definition, ctx)
    }

    /// Build strategies in declaration order
    pub fn create_all(
        &self,
        definitions: &[Definition],
        ctx: &BuildContext<'_>,
    ) -> Result<Vec<Box<dyn Strategy>>> {
        definitions.iter().map(|d| self.create(d, ctx)).collect()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new(default_types())
    }
}

/// Get the built-in strategy types
pub fn default_types() -> Vec<StrategyType> {
    vec![
        StrategyType::new("AssetSidebar", "Run nested strategies on an asset of each resource", |d, c| {
            Ok(Box::new(AssetSidebarStrategy::new(d, c)?))
        }),
        StrategyType::new("Calculator", "Evaluate equations into resource keywords", |d, _| {
            Ok(Box::new(CalculatorStrategy::new(d)?))
        }),
        StrategyType::new("CsvReader", "Load resources from a delimited text file", |d, c| {
            Ok(Box::new(CsvReaderStrategy::new(d, c)?))
        }),
        StrategyType::new("CsvWriter", "Write active resources to a delimited text file", |d, c| {
            Ok(Box::new(CsvWriterStrategy::new(d, c)?))
        }),
        StrategyType::new("Filter", "Keep resources whose keyword value is included", |d, _| {
            Ok(Box::new(FilterStrategy::new(d)?))
        }),
        StrategyType::new("GisIntersect", "Keep resources intersecting a reference geometry", |d, c| {
            Ok(Box::new(GisIntersectStrategy::new(d, c)?))
        }),
        StrategyType::new("GisOverlap", "Pair resources with overlapping geometries", |d, c| {
            Ok(Box::new(GisOverlapStrategy::new(d, c)?))
        }),
        StrategyType::new("GisUnion", "Union active geometries and record area ratios", |d, c| {
            Ok(Box::new(GisUnionStrategy::new(d, c)?))
        }),
        StrategyType::new("IsNumeric", "Keep resources whose keyword value is a number", |d, _| {
            Ok(Box::new(IsNumericStrategy::new(d)?))
        }),
        StrategyType::new("Limit", "Keep resources for which an equation is true", |d, _| {
            Ok(Box::new(LimitStrategy::new(d)?))
        }),
        StrategyType::new("NumericalSort", "Sort active resources by a numeric keyword", |d, _| {
            Ok(Box::new(NumericalSortStrategy::new(d)?))
        }),
        StrategyType::new("ResourceManager", "Discard, restore, delete and asset operations", |d, _| {
            Ok(Box::new(ResourceManagerStrategy::new(d)?))
        }),
        StrategyType::new("Sidebar", "Run nested strategies against the same resources", |d, c| {
            Ok(Box::new(SidebarStrategy::new(d, c)?))
        }),
        StrategyType::new("StereoPair", "Rank overlapping image pairs as stereo candidates", |d, c| {
            Ok(Box::new(StereoPairStrategy::new(d, c)?))
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MinerError;

    fn definition(yaml: &str) -> Definition {
        Definition::from_value(&serde_yaml::from_str(yaml).unwrap()).unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = StrategyRegistry::default();
        assert_eq!(registry.get("gisoverlap").map(|t| t.id), Some("GisOverlap"));
        assert_eq!(registry.get("NUMERICALSORT").map(|t| t.id), Some("NumericalSort"));
        assert!(registry.get("Database").is_none());
    }

    #[test]
    fn test_create_uses_canonical_kind() {
        let registry = StrategyRegistry::default();
        let globals = Globals::new();
        let ctx = BuildContext::new(&registry, &globals);
        let strategy = registry
            .create(&definition("Type: isnumeric\nName: Num\nKeyword: x\n"), &ctx)
            .unwrap();
        assert_eq!(strategy.kind(), "IsNumeric");
        assert_eq!(strategy.name(), "Num");
    }

    #[test]
    fn test_missing_type() {
        let registry = StrategyRegistry::default();
        let globals = Globals::new();
        let ctx = BuildContext::new(&registry, &globals);
        let err = registry.create(&definition("Name: Orphan\n"), &ctx).unwrap_err();
        assert!(matches!(err, MinerError::MissingStrategyType { .. }));
        assert!(err.to_string().contains("Orphan"));
    }

    #[test]
    fn test_unknown_type() {
        let registry = StrategyRegistry::default();
        let globals = Globals::new();
        let ctx = BuildContext::new(&registry, &globals);
        let err = registry
            .create(&definition("Name: Db\nType: Database\n"), &ctx)
            .unwrap_err();
        assert_eq!(err.to_string(), "Could not create a Db strategy for type [Database]");
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = StrategyRegistry::default();
        let before = registry.all().len();
        registry.register(StrategyType::new("filter", "replacement", |d, _| {
            Ok(Box::new(FilterStrategy::new(d)?))
        }));
        assert_eq!(registry.all().len(), before);
        assert_eq!(registry.get("Filter").map(|t| t.summary), Some("replacement"));
    }
}
