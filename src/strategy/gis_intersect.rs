//! GisIntersect strategy: keep resources intersecting a reference geometry

use std::fs;
use std::sync::Arc;

use super::{BuildContext, Strategy, StrategyInfo};
use crate::config::{Definition, Globals};
use crate::error::{self, Result};
use crate::expression::format_precise;
use crate::geometry::{Geometry, GeometryFormat, GeometryProvider};
use crate::resource::ResourceList;

#[derive(Debug)]
pub struct GisIntersectStrategy {
    info: StrategyInfo,
    definition: Definition,
    format: GeometryFormat,
    ratio_key: Option<String>,
    use_envelope: bool,
    provider: Arc<dyn GeometryProvider>,
}

impl GisIntersectStrategy {
    pub fn new(definition: &Definition, ctx: &BuildContext<'_>) -> Result<Self> {
        let info = StrategyInfo::new(definition, "GisIntersect");
        if !definition.contains("GisGeometry") && !definition.contains("GisGeometryFile") {
            return Err(error::missing_key(&info.name, &info.kind, "GisGeometry"));
        }
        let format = match definition.get_str("GisType") {
            Some(name) => GeometryFormat::from_name(&name)?,
            None => GeometryFormat::default(),
        };
        Ok(Self {
            format,
            ratio_key: definition.get_str("RatioKey").filter(|k| !k.is_empty()),
            use_envelope: definition.get_bool("UseEnvelope", false)?,
            provider: Arc::clone(&ctx.geometry),
            definition: definition.clone(),
            info,
        })
    }

    /// Reference geometry with `%N` arguments bound from the run's globals
    fn reference(&self, globals: &Globals) -> Result<Geometry> {
        let text = match self.definition.translate("GisGeometry", globals) {
            Some(text) => text,
            None => {
                let path = self
                    .definition
                    .translate("GisGeometryFile", globals)
                    .unwrap_or_default();
                fs::read_to_string(&path).map_err(|e| error::file_read_failed(&path, e.to_string()))?
            }
        };
        let geometry = self.provider.parse(&text, self.format)?;
        if self.use_envelope {
            return self
                .provider
                .envelope(&geometry)
                .ok_or_else(|| error::geometry_parse_failed("reference geometry has no envelope"));
        }
        Ok(geometry)
    }
}

impl Strategy for GisIntersectStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, globals: &Globals) -> Result<usize> {
        let reference = self.reference(globals)?;

        let ratios = resources
            .active_iter()
            .map(|resource| {
                resource
                    .geometry()
                    .filter(|geometry| self.provider.intersects(geometry, &reference))
                    .map(|geometry| self.provider.intersect_ratio(geometry, &reference))
            })
            .collect::<Vec<_>>();

        let mut kept = 0;
        for (resource, ratio) in resources.active_iter_mut().zip(ratios) {
            let Some(ratio) = ratio else {
                decision!(self.info, resource = %resource.identity(), "no intersection, discarded");
                resource.discard();
                continue;
            };
            if let Some(key) = &self.ratio_key {
                resource.set(key.clone(), format_precise(ratio));
            }
            kept += 1;
        }
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PlanarGeometry;
    use crate::resource::{Attributes, Resource};
    use crate::strategy::StrategyRegistry;

    fn intersect(yaml: &str) -> Result<GisIntersectStrategy> {
        let registry = StrategyRegistry::default();
        let globals = Globals::new();
        let ctx = BuildContext::new(&registry, &globals);
        GisIntersectStrategy::new(&Definition::from_value(&serde_yaml::from_str(yaml).unwrap()).unwrap(), &ctx)
    }

    fn footprint(id: &str, wkt: &str) -> Resource {
        Resource::new(id).with_geometry(PlanarGeometry.parse(wkt, GeometryFormat::Wkt).unwrap())
    }

    fn list() -> ResourceList {
        vec![
            footprint("inside", "POLYGON((1 1, 2 1, 2 2, 1 2, 1 1))"),
            footprint("half", "POLYGON((3 0, 5 0, 5 2, 3 2, 3 0))"),
            footprint("outside", "POLYGON((10 10, 11 10, 11 11, 10 11, 10 10))"),
            Resource::new("nogeom"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_discards_non_intersecting_and_records_ratio() {
        let strategy = intersect(
            "GisGeometry: 'POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))'\nRatioKey: Coverage\n",
        )
        .unwrap();
        let mut resources = list();
        assert_eq!(strategy.apply(&mut resources, &Globals::new()).unwrap(), 2);
        assert_eq!(resources.by_id("inside").and_then(|r| r.get("Coverage")), Some("1"));
        assert_eq!(resources.by_id("half").and_then(|r| r.get("Coverage")), Some("0.5"));
        assert!(resources.by_id("outside").is_some_and(Resource::is_discarded));
        assert!(resources.by_id("nogeom").is_some_and(Resource::is_discarded));
    }

    #[test]
    fn test_ratio_written_to_each_duplicate_identity() {
        let strategy = intersect(
            "GisGeometry: 'POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))'\nRatioKey: Coverage\n",
        )
        .unwrap();
        let mut resources: ResourceList = vec![
            footprint("dup", "POLYGON((1 1, 2 1, 2 2, 1 2, 1 1))"),
            footprint("dup", "POLYGON((3 0, 5 0, 5 2, 3 2, 3 0))"),
        ]
        .into_iter()
        .collect();
        assert_eq!(strategy.apply(&mut resources, &Globals::new()).unwrap(), 2);
        let coverage: Vec<_> = resources.active_iter().map(|r| r.get("Coverage")).collect();
        assert_eq!(coverage, vec![Some("1"), Some("0.5")]);
    }

    #[test]
    fn test_geometry_args_and_envelope() {
        let strategy = intersect(
            "GisGeometry: 'POLYGON((%1 %1, 12 10, 12 12, 10 12, %1 %1))'\nGisGeometryArgs: [corner]\nUseEnvelope: true\n",
        )
        .unwrap();
        let globals = Globals::from_attributes([("corner", "10")].into_iter().collect::<Attributes>());
        let mut resources = list();
        assert_eq!(strategy.apply(&mut resources, &globals).unwrap(), 1);
        assert!(resources.by_id("outside").is_some_and(Resource::is_active));
    }

    #[test]
    fn test_geometry_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.wkt");
        std::fs::write(&path, "POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))\n").unwrap();
        let strategy = intersect(&format!("GisGeometryFile: '{}'\n", path.display())).unwrap();
        let mut resources = list();
        assert_eq!(strategy.apply(&mut resources, &Globals::new()).unwrap(), 2);
    }

    #[test]
    fn test_reference_required() {
        assert!(intersect("Type: GisIntersect\n").is_err());
    }
}
