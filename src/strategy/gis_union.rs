//! GisUnion strategy: union active footprints and record each one's share

use std::sync::Arc;

use super::{BuildContext, Strategy, StrategyInfo};
use crate::config::{Definition, Globals};
use crate::error::Result;
use crate::expression::format_precise;
use crate::geometry::{Geometry, GeometryProvider};
use crate::resource::ResourceList;

#[derive(Debug)]
pub struct GisUnionStrategy {
    info: StrategyInfo,
    ratio_key: String,
    geometry_key: Option<String>,
    provider: Arc<dyn GeometryProvider>,
}

impl GisUnionStrategy {
    pub fn new(definition: &Definition, ctx: &BuildContext<'_>) -> Result<Self> {
        Ok(Self {
            info: StrategyInfo::new(definition, "GisUnion"),
            ratio_key: definition.get_or("RatioKey", "GisUnionRatio"),
            geometry_key: definition.get_str("UnionGeometryKey").filter(|k| !k.is_empty()),
            provider: Arc::clone(&ctx.geometry),
        })
    }
}

impl Strategy for GisUnionStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, _globals: &Globals) -> Result<usize> {
        let sources: Vec<usize> = resources
            .active_indices()
            .into_iter()
            .filter(|&slot| resources.get(slot).is_some_and(|r| r.geometry().is_some()))
            .collect();

        let geometries: Vec<Geometry> = sources
            .iter()
            .filter_map(|&slot| resources.get(slot).and_then(|r| r.geometry()).cloned())
            .collect();
        let Some(union) = union_all(self.provider.as_ref(), &geometries) else {
            return Ok(0);
        };

        let total = self.provider.area(&union);
        let union_text = self.geometry_key.as_ref().map(|_| self.provider.to_wkt(&union));
        decision!(self.info, sources = sources.len(), area = total, "union computed");

        for &slot in &sources {
            let Some(resource) = resources.get_mut(slot) else {
                continue;
            };
            let ratio = match resource.geometry() {
                Some(geometry) if total > 0.0 => self.provider.area(geometry) / total,
                _ => 0.0,
            };
            resource.set(self.ratio_key.clone(), format_precise(ratio));
            if let (Some(key), Some(text)) = (&self.geometry_key, &union_text) {
                resource.set(key.clone(), text.clone());
            }
        }
        Ok(sources.len())
    }
}

/// Unions a set of geometries in order
fn union_all(provider: &dyn GeometryProvider, geometries: &[Geometry]) -> Option<Geometry> {
    geometries
        .iter()
        .cloned()
        .reduce(|acc, g| provider.union(&acc, &g))
}
