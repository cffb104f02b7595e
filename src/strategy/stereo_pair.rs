//! StereoPair strategy: overlap pairing constrained and ranked for stereo
//!
//! Each image is screened and scored against the `ImageStrength` windows.
//! Overlapping pairs get derived geometry metrics (parallax, shadow tip
//! distance, resolution ratio, azimuth deltas, stereo angle, vertical
//! precision), must pass every `StereoStrength` window and are scored
//! against them. A Calculator step over the pair record then produces the
//! final rank.

use std::collections::HashMap;

use serde_yaml::{Mapping, Value};

use super::gis_overlap::{OverlapEngine, PairProcessor};
use super::{BuildContext, Calculation, Strategy, StrategyInfo, retain_active};
use crate::config::{Definition, Globals, scalar_to_string};
use crate::error::{self, Result};
use crate::expression::format_number;
use crate::resource::{Resource, ResourceList};

/// Stand-in for a zero stereo angle tangent
const MIN_STEREO_TANGENT: f64 = 1e-7;

/// Acceptance window `[low, high]` with a triangular score peaking at `peak`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankWindow {
    pub low: f64,
    pub high: f64,
    pub peak: f64,
    pub weight: f64,
}

impl RankWindow {
    /// Builds a window from `[low, high, peak]` or `[low, high, peak, weight]`
    pub fn from_values(key: &str, values: &[String]) -> Result<Self> {
        if !(3..=4).contains(&values.len()) {
            return Err(error::invalid_constraint(
                key,
                format!("expected [low, high, peak] or [low, high, peak, weight], found {} value(s)", values.len()),
            ));
        }
        let mut numbers = Vec::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            let number: f64 = value.trim().parse().map_err(|_| {
                error::invalid_constraint(key, format!("value [{}] ({value}) is not a number", i + 1))
            })?;
            numbers.push(number);
        }

        let window = Self {
            low: numbers[0],
            high: numbers[1],
            peak: numbers[2],
            weight: numbers.get(3).copied().unwrap_or(1.0),
        };
        if window.peak < window.low || window.peak > window.high {
            return Err(error::invalid_constraint(
                key,
                format!(
                    "pivot value [{}] exceeds min/max ranges [{},{}]",
                    values[2], values[0], values[1]
                ),
            ));
        }
        Ok(window)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    /// 0 outside the window, rising to `weight` at the peak
    pub fn score(&self, value: f64) -> f64 {
        if !self.contains(value) {
            return 0.0;
        }
        let fraction = if value <= self.peak {
            if self.peak > self.low {
                (value - self.low) / (self.peak - self.low)
            } else {
                1.0
            }
        } else if self.high > self.peak {
            (self.high - value) / (self.high - self.peak)
        } else {
            1.0
        };
        fraction * self.weight
    }
}

/// Windows keyed by metric name, in declaration order
fn windows(mapping: Option<&Mapping>) -> Result<Vec<(String, RankWindow)>> {
    let Some(mapping) = mapping else {
        return Ok(Vec::new());
    };
    mapping
        .iter()
        .filter_map(|(k, v)| scalar_to_string(k).map(|k| (k, v)))
        .map(|(key, value)| {
            let values: Vec<String> = match value {
                Value::Sequence(items) => items.iter().filter_map(scalar_to_string).collect(),
                Value::String(text) => text.split(',').map(|s| s.trim().to_string()).collect(),
                other => scalar_to_string(other).into_iter().collect(),
            };
            RankWindow::from_values(&key, &values).map(|window| (key, window))
        })
        .collect()
}

/// Scoring and pair metrics applied on top of the overlap engine
#[derive(Debug)]
struct StereoRules {
    image_strength: Vec<(String, RankWindow)>,
    stereo_strength: Vec<(String, RankWindow)>,
    keyword_map: HashMap<String, String>,
    calculation: Calculation,
    pixel_precision: f64,
    use_stereo_angle: bool,
    suffix_a: String,
    suffix_b: String,
}

impl StereoRules {
    /// Attribute name for a metric, after `KeywordMap`
    fn key<'a>(&'a self, metric: &'a str) -> &'a str {
        self.keyword_map.get(metric).map_or(metric, String::as_str)
    }

    /// Numeric metric value; present but unparsable values count as 0
    fn value(&self, resource: &Resource, metric: &str) -> Option<f64> {
        resource
            .get(self.key(metric))
            .map(|v| v.trim().parse().unwrap_or(0.0))
    }

    fn passes(&self, resource: &Resource, windows: &[(String, RankWindow)]) -> bool {
        windows.iter().all(|(metric, window)| {
            self.value(resource, metric)
                .is_some_and(|value| window.contains(value))
        })
    }

    /// Sums window scores over the metrics present, recording each as
    /// `<metric><suffix>` on `out`
    fn rank(&self, resource: &Resource, windows: &[(String, RankWindow)], out: &mut Resource, suffix: &str) -> f64 {
        let mut total = 0.0;
        for (metric, window) in windows {
            if let Some(value) = self.value(resource, metric) {
                let score = window.score(value);
                out.set(format!("{metric}{suffix}"), format_number(score));
                total += score;
            }
        }
        total
    }

    fn number(&self, resource: &Resource, metric: &str) -> f64 {
        self.value(resource, metric).unwrap_or(0.0)
    }

    /// Euclidean distance between the two images' `(x, y)` metrics
    fn distance(&self, a: &Resource, b: &Resource, x: &str, y: &str) -> f64 {
        let dx = self.number(a, x) - self.number(b, x);
        let dy = self.number(a, y) - self.number(b, y);
        dx.hypot(dy)
    }

    /// Angular difference in degrees, folded into [0, 180]
    fn delta(&self, a: &Resource, b: &Resource, metric: &str) -> Option<f64> {
        let first = self.value(a, metric)?;
        let second = self.value(b, metric)?;
        Some((second - first).to_radians().cos().acos().to_degrees())
    }

    /// Looks a stereo angle input up on the image, then the pair, then the globals
    fn angle_input(&self, image: &Resource, pair: &Resource, globals: &Globals, metric: &str) -> Option<f64> {
        let key = self.key(metric);
        image
            .get(key)
            .or_else(|| pair.get(key))
            .or_else(|| globals.get(key))
            .and_then(|v| v.trim().parse().ok())
    }

    /// Angle in degrees between the two surface-to-spacecraft vectors
    fn stereo_angle(&self, a: &Resource, b: &Resource, pair: &Resource, globals: &Globals) -> Option<f64> {
        let look = |image: &Resource| -> Option<[f64; 3]> {
            let input = |metric: &str| self.angle_input(image, pair, globals, metric);
            let radius = input("CenterRadius")? / 1000.0;
            let lat = input("CenterLatitude")?.to_radians();
            let lon = input("CenterLongitude")?.to_radians();
            let distance = input("TargetCenterDistance")?;
            let sc_lat = input("SubspacecraftLatitude")?.to_radians();
            let sc_lon = input("SubspacecraftLongitude")?.to_radians();

            let surface = [
                radius * lon.cos() * lat.cos(),
                radius * lon.sin() * lat.cos(),
                radius * lat.sin(),
            ];
            let spacecraft = [
                distance * sc_lon.cos() * sc_lat.cos(),
                distance * sc_lon.sin() * sc_lat.cos(),
                distance * sc_lat.sin(),
            ];
            Some([
                spacecraft[0] - surface[0],
                spacecraft[1] - surface[1],
                spacecraft[2] - surface[2],
            ])
        };

        let va = look(a)?;
        let vb = look(b)?;
        let dot: f64 = va.iter().zip(&vb).map(|(x, y)| x * y).sum();
        let norm = |v: &[f64; 3]| v.iter().map(|c| c * c).sum::<f64>().sqrt();
        let angle = (dot / (norm(&va) * norm(&vb))).acos().to_degrees();
        (!angle.is_nan()).then_some(angle)
    }
}

impl PairProcessor for StereoRules {
    fn accept_candidate(&self, candidate: &Resource) -> bool {
        self.passes(candidate, &self.image_strength)
    }

    fn complete_pair(&self, a: &Resource, b: &Resource, pair: &mut Resource, globals: &Globals) -> Result<bool> {
        let rank_a = self.rank(a, &self.image_strength, pair, &format!("Rank{}", self.suffix_a));
        let rank_b = self.rank(b, &self.image_strength, pair, &format!("Rank{}", self.suffix_b));
        pair.set(format!("ImageStrengthRank{}", self.suffix_a), format_number(rank_a));
        pair.set(format!("ImageStrengthRank{}", self.suffix_b), format_number(rank_b));
        pair.set("ImageStrengthRank", format_number((rank_a + rank_b) / 2.0));

        let parallax = self.distance(a, b, "ParallaxX", "ParallaxY");
        pair.set("ParallaxHeightRatio", format_number(parallax));
        pair.set("ShadowTipDistance", format_number(self.distance(a, b, "ShadowX", "ShadowY")));

        let resolution_a = self.number(a, "Resolution");
        let resolution_b = self.number(b, "Resolution");
        let mut resolution_ratio = resolution_a / resolution_b;
        if resolution_ratio < 1.0 {
            resolution_ratio = 1.0 / resolution_ratio;
        }
        pair.set("ResolutionRatio", format_number(resolution_ratio));

        if let Some(delta) = self.delta(a, b, "SubSolarGroundAzimuth") {
            pair.set("DeltaSolarAzimuth", format_number(delta));
        }
        if let Some(delta) = self.delta(a, b, "SubSpacecraftGroundAzimuth") {
            pair.set("DeltaSpacecraftAzimuth", format_number(delta));
        }

        let mut tangent = parallax;
        if let Some(angle) = self.stereo_angle(a, b, pair, globals) {
            pair.set("StereoAngle", format_number(angle));
            if self.use_stereo_angle {
                tangent = angle.to_radians().tan();
            }
        }
        if tangent.abs() < f64::EPSILON {
            tangent = MIN_STEREO_TANGENT;
        }
        let precision = self.pixel_precision * resolution_a.max(resolution_b) / tangent;
        pair.set("VerticalPrecision", format_number(precision));

        if !self.passes(pair, &self.stereo_strength) {
            return Ok(false);
        }
        let snapshot = pair.clone();
        let stereo_rank = self.rank(&snapshot, &self.stereo_strength, pair, "Rank");
        pair.set("StereoStrengthRank", format_number(stereo_rank));

        self.calculation.apply_to(pair, globals)?;
        Ok(true)
    }
}

#[derive(Debug)]
pub struct StereoPairStrategy {
    info: StrategyInfo,
    engine: OverlapEngine,
    rules: StereoRules,
}

impl StereoPairStrategy {
    pub fn new(definition: &Definition, ctx: &BuildContext<'_>) -> Result<Self> {
        let info = StrategyInfo::new(definition, "StereoPair");
        let engine = OverlapEngine::from_definition(definition, ctx, "GisOverlap")?;

        let stereo_strength = windows(definition.mapping("StereoStrength"))?;
        if stereo_strength.is_empty() {
            return Err(error::missing_key(&info.name, &info.kind, "StereoStrength"));
        }
        let keyword_map = definition
            .mapping("KeywordMap")
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| Some((scalar_to_string(k)?, scalar_to_string(v)?)))
                    .collect()
            })
            .unwrap_or_default();

        let rules = StereoRules {
            image_strength: windows(definition.mapping("ImageStrength"))?,
            stereo_strength,
            keyword_map,
            calculation: Calculation::from_definition(definition)?,
            pixel_precision: definition.get_f64("PixelPrecisionMatch", 2.0)?,
            use_stereo_angle: definition.get_bool("UseStereoAngle", true)?,
            suffix_a: engine.suffix_a.clone(),
            suffix_b: engine.suffix_b.clone(),
        };
        Ok(Self { info, engine, rules })
    }
}

impl Strategy for StereoPairStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, globals: &Globals) -> Result<usize> {
        let screened = retain_active(&self.info, resources, |resource| {
            Ok(self.rules.passes(resource, &self.rules.image_strength))
        })?;
        decision!(self.info, screened, "images passing ImageStrength");

        self.engine.run(&self.info, resources, globals, &self.rules)
    }
}
