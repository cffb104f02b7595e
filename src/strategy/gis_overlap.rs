//! GisOverlap strategy and the pairing engine shared with StereoPair
//!
//! Every active resource with a geometry is compared against a candidate
//! list. Each accepted pair becomes a new resource `A_B` holding both sides'
//! keywords (suffixed) and the overlap ratios, and is stored in an asset on
//! `A`. Resources with a geometry that end up with no pairs are discarded;
//! an empty candidate list leaves the resources untouched.

use std::fmt;
use std::sync::Arc;

use super::{BuildContext, Pipeline, Strategy, StrategyInfo, load_nested};
use crate::config::{Definition, Globals};
use crate::error::Result;
use crate::expression::format_precise;
use crate::geometry::GeometryProvider;
use crate::resource::{Attributes, Resource, ResourceList};

const EPSILON: f64 = 1e-9;

/// How the pair record's geometry is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapMerge {
    #[default]
    None,
    Intersection,
    Union,
    Centroid,
    ResourceA,
    ResourceB,
}

impl OverlapMerge {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "none" => Some(Self::None),
            "intersection" => Some(Self::Intersection),
            "union" => Some(Self::Union),
            "centroid" => Some(Self::Centroid),
            "resourcea" => Some(Self::ResourceA),
            "resourceb" => Some(Self::ResourceB),
            _ => None,
        }
    }
}

impl fmt::Display for OverlapMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Intersection => "intersection",
            Self::Union => "union",
            Self::Centroid => "centroid",
            Self::ResourceA => "resourcea",
            Self::ResourceB => "resourceb",
        };
        f.write_str(name)
    }
}

/// Hooks a pairing strategy adds on top of plain overlap detection
pub(crate) trait PairProcessor {
    /// Whether a candidate may take part in pairs at all
    fn accept_candidate(&self, _candidate: &Resource) -> bool {
        true
    }

    /// Completes the pair record; `false` rejects the pair
    fn complete_pair(
        &self,
        a: &Resource,
        b: &Resource,
        pair: &mut Resource,
        globals: &Globals,
    ) -> Result<bool>;
}

/// Settings and nested pipelines of an overlap search
#[derive(Debug)]
pub(crate) struct OverlapEngine {
    pub minimum: f64,
    pub maximum: f64,
    pub ratio_key: String,
    pub asset: String,
    pub merge: OverlapMerge,
    pub suffix_a: String,
    pub suffix_b: String,
    pub propagate: Vec<String>,
    candidates: Pipeline,
    overlaps: Pipeline,
    provider: Arc<dyn GeometryProvider>,
}

impl OverlapEngine {
    pub fn from_definition(definition: &Definition, ctx: &BuildContext<'_>, default_asset: &str) -> Result<Self> {
        let merge = match definition.get_str("OverlapMerge") {
            Some(text) => OverlapMerge::parse(&text).ok_or_else(|| definition.invalid("OverlapMerge", &text))?,
            None => OverlapMerge::default(),
        };

        Ok(Self {
            minimum: definition.get_f64("OverlapMinimum", 0.0)?,
            maximum: definition.get_f64("OverlapMaximum", 1.0)?,
            ratio_key: definition.get_or("OverlapRatioKey", "OverlapRatio"),
            asset: definition.get_or("Asset", default_asset),
            merge,
            suffix_a: definition.get_or("MergeSuffixA", "A"),
            suffix_b: definition.get_or("MergeSuffixB", "B"),
            propagate: definition.get_list("PropagateKeywords"),
            candidates: load_nested(definition, "CandidateStrategies", "CandidateConfigFile", ctx)?,
            overlaps: load_nested(definition, "OverlapStrategies", "OverlapConfigFile", ctx)?,
            provider: Arc::clone(&ctx.geometry),
        })
    }

    fn within_limits(&self, ratio: f64) -> bool {
        (ratio > self.minimum || (ratio - self.minimum).abs() < EPSILON)
            && (ratio < self.maximum || (ratio - self.maximum).abs() < EPSILON)
    }

    /// Candidate resources: a detached copy of the active list, optionally
    /// reduced by the candidate strategies
    fn candidates(&self, resources: &ResourceList, globals: &Globals, processor: &dyn PairProcessor) -> Result<Vec<Resource>> {
        let mut copy = resources.clone_active();
        if !self.candidates.is_empty() {
            self.candidates.run(&mut copy, globals)?;
        }
        Ok(copy
            .active_iter()
            .filter(|r| r.geometry().is_some() && processor.accept_candidate(r))
            .map(Resource::clone_detached)
            .collect())
    }

    /// The pair record `A_B` with suffixed keywords and ratios
    pub fn compose(&self, a: &Resource, b: &Resource, ratio_a: f64, ratio_b: f64) -> Resource {
        let mut attributes = Attributes::new();
        attributes.merge_suffixed(a.attributes(), &self.suffix_a, &self.propagate);
        attributes.merge_suffixed(b.attributes(), &self.suffix_b, &self.propagate);

        let mut pair = Resource::with_attributes(format!("{}_{}", a.identity(), b.identity()), attributes);
        pair.set(format!("{}{}", self.ratio_key, self.suffix_a), format_precise(ratio_a));
        pair.set(format!("{}{}", self.ratio_key, self.suffix_b), format_precise(ratio_b));
        pair.set(self.ratio_key.clone(), format_precise(ratio_a));

        let (Some(geom_a), Some(geom_b)) = (a.geometry(), b.geometry()) else {
            return pair;
        };
        let merged = match self.merge {
            OverlapMerge::None => None,
            OverlapMerge::Intersection => Some(self.provider.intersection(geom_a, geom_b)),
            OverlapMerge::Union => Some(self.provider.union(geom_a, geom_b)),
            OverlapMerge::ResourceA => Some(geom_a.clone()),
            OverlapMerge::ResourceB => Some(geom_b.clone()),
            OverlapMerge::Centroid => {
                let common = self.provider.intersection(geom_a, geom_b);
                self.provider
                    .centroid(&common)
                    .map(|(x, y)| self.provider.point(x, y))
            }
        };
        if let Some(geometry) = merged {
            if let Some((x, y)) = self.provider.centroid(&geometry) {
                pair.set("GisOverlapCentroidX", format_precise(x));
                pair.set("GisOverlapCentroidY", format_precise(y));
            }
            pair.set_geometry(Some(geometry));
        }
        pair
    }

    /// Pairs every active resource against the candidates
    ///
    /// Returns how many resources received at least one pair.
    pub fn run(
        &self,
        info: &StrategyInfo,
        resources: &mut ResourceList,
        globals: &Globals,
        processor: &dyn PairProcessor,
    ) -> Result<usize> {
        let active = resources.active_indices();
        if active.is_empty() {
            return Ok(0);
        }
        let saved = resources.discard_state();
        let candidates = self.candidates(resources, globals, processor)?;
        decision!(info, active = active.len(), candidates = candidates.len(), "overlap search");
        if candidates.is_empty() {
            resources.restore_discard_state(&saved);
            return Ok(0);
        }

        let mut paired = 0;
        let mut unpaired = Vec::new();
        for slot in active {
            // Resources without a footprint take no part and stay as they were
            let pairs = match resources.get(slot) {
                Some(resource) if resource.geometry().is_some() => {
                    self.pairs_for(info, resource, &candidates, globals, processor)?
                }
                _ => continue,
            };
            if pairs.is_empty() {
                unpaired.push(slot);
                continue;
            }

            let Some(resource) = resources.get_mut(slot) else {
                continue;
            };
            resource.set_asset(&self.asset, pairs);
            paired += 1;

            if !self.overlaps.is_empty() {
                let scope = globals.with_scope(resource.attributes().clone());
                resources.isolate(slot, |single| self.overlaps.run(single, &scope))?;
            }
        }

        resources.restore_discard_state(&saved);
        for slot in unpaired {
            if let Some(resource) = resources.get_mut(slot) {
                decision!(info, resource = %resource.identity(), "no overlaps, discarded");
                resource.discard();
            }
        }
        Ok(paired)
    }

    fn pairs_for(
        &self,
        info: &StrategyInfo,
        resource: &Resource,
        candidates: &[Resource],
        globals: &Globals,
        processor: &dyn PairProcessor,
    ) -> Result<ResourceList> {
        let mut pairs = ResourceList::new();
        let Some(geometry) = resource.geometry() else {
            return Ok(pairs);
        };

        for candidate in candidates {
            if resource.same_identity(candidate) {
                continue;
            }
            let Some(other) = candidate.geometry() else {
                continue;
            };
            if !self.provider.intersects(geometry, other) {
                continue;
            }
            let ratio_a = self.provider.intersect_ratio(geometry, other);
            if ratio_a <= 0.0 || !self.within_limits(ratio_a) {
                continue;
            }
            let ratio_b = self.provider.intersect_ratio(other, geometry);

            let mut pair = self.compose(resource, candidate, ratio_a, ratio_b);
            if processor.complete_pair(resource, candidate, &mut pair, globals)? {
                decision!(info, pair = %pair.identity(), ratio_a, ratio_b, "pair accepted");
                pairs.append(pair);
            } else {
                decision!(info, pair = %pair.identity(), "pair rejected");
            }
        }
        Ok(pairs)
    }
}

/// Plain overlap detection without extra pair conditions
struct AcceptAll;

impl PairProcessor for AcceptAll {
    fn complete_pair(&self, _a: &Resource, _b: &Resource, _pair: &mut Resource, _globals: &Globals) -> Result<bool> {
        Ok(true)
    }
}

#[derive(Debug)]
pub struct GisOverlapStrategy {
    info: StrategyInfo,
    engine: OverlapEngine,
}

impl GisOverlapStrategy {
    pub fn new(definition: &Definition, ctx: &BuildContext<'_>) -> Result<Self> {
        Ok(Self {
            info: StrategyInfo::new(definition, "GisOverlap"),
            engine: OverlapEngine::from_definition(definition, ctx, "GisOverlap")?,
        })
    }
}

impl Strategy for GisOverlapStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, globals: &Globals) -> Result<usize> {
        self.engine.run(&self.info, resources, globals, &AcceptAll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryFormat, PlanarGeometry};
    use crate::strategy::StrategyRegistry;

    fn overlap(yaml: &str) -> Result<GisOverlapStrategy> {
        let registry = StrategyRegistry::default();
        let globals = Globals::new();
        let ctx = BuildContext::new(&registry, &globals);
        GisOverlapStrategy::new(&Definition::from_value(&serde_yaml::from_str(yaml).unwrap()).unwrap(), &ctx)
    }

    fn footprint(id: &str, wkt: &str) -> Resource {
        Resource::new(id)
            .with("Target", "Mars")
            .with_geometry(PlanarGeometry.parse(wkt, GeometryFormat::Wkt).unwrap())
    }

    /// a and b overlap by half of a; b is twice a's size; c is far away
    fn scene() -> ResourceList {
        vec![
            footprint("a", "POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))"),
            footprint("b", "POLYGON((1 0, 5 0, 5 2, 1 2, 1 0))"),
            footprint("c", "POLYGON((20 20, 21 20, 21 21, 20 21, 20 20))"),
        ]
        .into_iter()
        .collect()
    }

    fn pair<'a>(list: &'a ResourceList, owner: &str, identity: &str) -> &'a Resource {
        list.by_id(owner)
            .and_then(|r| r.asset("GisOverlap"))
            .and_then(|asset| asset.by_id(identity))
            .unwrap()
    }

    #[test]
    fn test_pairs_are_symmetric() {
        let mut list = scene();
        let paired = overlap("Type: GisOverlap\n").unwrap().apply(&mut list, &Globals::new()).unwrap();
        assert_eq!(paired, 2);

        let ab = pair(&list, "a", "a_b");
        let ba = pair(&list, "b", "b_a");
        assert_eq!(ab.get("OverlapRatioA"), Some("0.5"));
        assert_eq!(ab.get("OverlapRatioB"), Some("0.25"));
        assert_eq!(ab.get("OverlapRatioA"), ba.get("OverlapRatioB"));
        assert_eq!(ab.get("OverlapRatioB"), ba.get("OverlapRatioA"));
        assert_eq!(ab.get("OverlapRatio"), Some("0.5"));
        assert_eq!(ab.get("IdentityA"), Some("a"));
        assert_eq!(ab.get("TargetB"), Some("Mars"));
    }

    #[test]
    fn test_unpaired_discarded() {
        let mut list = scene();
        overlap("Type: GisOverlap\n").unwrap().apply(&mut list, &Globals::new()).unwrap();
        assert!(list.by_id("c").is_some_and(Resource::is_discarded));
        assert!(list.by_id("a").is_some_and(Resource::is_active));
    }

    #[test]
    fn test_resource_without_geometry_stays_active() {
        let mut list = scene();
        list.append(Resource::new("nogeom").with("Target", "Mars"));
        let paired = overlap("Type: GisOverlap\n").unwrap().apply(&mut list, &Globals::new()).unwrap();
        assert_eq!(paired, 2);
        assert!(list.by_id("nogeom").is_some_and(Resource::is_active));
        assert!(!list.by_id("nogeom").unwrap().has_asset("GisOverlap"));
        assert!(list.by_id("c").is_some_and(Resource::is_discarded));
    }

    #[test]
    fn test_no_candidates_leaves_list_untouched() {
        let mut list: ResourceList = vec![
            footprint("a", "POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))"),
            footprint("b", "POLYGON((1 0, 5 0, 5 2, 1 2, 1 0))"),
        ]
        .into_iter()
        .collect();
        let paired = overlap(
            r#"
Type: GisOverlap
CandidateStrategies:
  - Type: Filter
    Keyword: Target
    Include: Moon
"#,
        )
        .unwrap()
        .apply(&mut list, &Globals::new())
        .unwrap();
        assert_eq!(paired, 0);
        assert_eq!(list.active_count(), 2);
        assert!(!list.by_id("a").unwrap().has_asset("GisOverlap"));
    }

    #[test]
    fn test_ratio_limits() {
        let mut list = scene();
        overlap("Type: GisOverlap\nOverlapMinimum: 0.4\n")
            .unwrap()
            .apply(&mut list, &Globals::new())
            .unwrap();
        // b sees only a quarter of itself covered by a
        assert!(list.by_id("b").is_some_and(Resource::is_discarded));
        assert!(list.by_id("a").is_some_and(Resource::is_active));
    }

    #[test]
    fn test_merge_records_centroid() {
        let mut list = scene();
        overlap("Type: GisOverlap\nOverlapMerge: Intersection\nPropagateKeywords: Identity\n")
            .unwrap()
            .apply(&mut list, &Globals::new())
            .unwrap();
        let ab = pair(&list, "a", "a_b");
        assert_eq!(ab.get("GisOverlapCentroidX"), Some("1.5"));
        assert_eq!(ab.get("GisOverlapCentroidY"), Some("1"));
        assert!(ab.geometry().is_some());
        assert!(!ab.contains("TargetA"));
    }

    #[test]
    fn test_candidate_strategies_limit_partners() {
        let mut list = scene();
        list.by_id_mut("b").unwrap().set("Target", "Moon");
        overlap(
            r#"
Type: GisOverlap
CandidateStrategies:
  - Type: Filter
    Keyword: Target
    Include: Mars
"#,
        )
        .unwrap()
        .apply(&mut list, &Globals::new())
        .unwrap();
        // b may still pair with a, but nobody may pair with b
        assert!(list.by_id("a").is_some_and(Resource::is_discarded));
        assert!(list.by_id("b").is_some_and(Resource::is_active));
    }

    #[test]
    fn test_overlap_strategies_see_pairs() {
        let mut list = scene();
        overlap(
            r#"
Type: GisOverlap
OverlapStrategies:
  - Type: AssetSidebar
    Asset: GisOverlap
    Strategies:
      - Type: Calculator
        Equation: OverlapRatio * 100
        Result: Percent
"#,
        )
        .unwrap()
        .apply(&mut list, &Globals::new())
        .unwrap();
        assert_eq!(pair(&list, "a", "a_b").get("Percent"), Some("50"));
    }

    #[test]
    fn test_invalid_merge() {
        let err = overlap("Type: GisOverlap\nOverlapMerge: blend\n").unwrap_err();
        assert!(err.to_string().contains("blend"));
    }
}
