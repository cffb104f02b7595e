//! Geometry seam
//!
//! Strategies never touch a concrete geometry library. They hold opaque
//! [`Geometry`] handles and ask a [`GeometryProvider`] for every operation.
//! [`PlanarGeometry`] is the default provider.

mod planar;
mod wkb;

pub use planar::PlanarGeometry;

use std::fmt;
use std::sync::Arc;

use crate::error::{self, Result};

/// Opaque, cheaply clonable geometry handle
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry(Arc<geo_types::Geometry<f64>>);

impl Geometry {
    pub fn new(geometry: geo_types::Geometry<f64>) -> Self {
        Self(Arc::new(geometry))
    }

    pub fn inner(&self) -> &geo_types::Geometry<f64> {
        &self.0
    }
}

impl From<geo_types::Geometry<f64>> for Geometry {
    fn from(geometry: geo_types::Geometry<f64>) -> Self {
        Self::new(geometry)
    }
}

/// Text encodings accepted for geometry import and export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryFormat {
    #[default]
    Wkt,
    /// Hex-encoded well-known binary
    Wkb,
}

impl GeometryFormat {
    /// Parses a format name case-insensitively
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "wkt" => Ok(Self::Wkt),
            "wkb" => Ok(Self::Wkb),
            other => Err(error::geometry_parse_failed(format!(
                "unsupported geometry type [{other}], expected wkt or wkb"
            ))),
        }
    }
}

impl fmt::Display for GeometryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wkt => write!(f, "wkt"),
            Self::Wkb => write!(f, "wkb"),
        }
    }
}

/// 2-D geometry operations used by the GIS strategies
pub trait GeometryProvider: fmt::Debug + Send + Sync {
    fn parse(&self, text: &str, format: GeometryFormat) -> Result<Geometry>;

    fn intersects(&self, a: &Geometry, b: &Geometry) -> bool;

    fn intersection(&self, a: &Geometry, b: &Geometry) -> Geometry;

    fn union(&self, a: &Geometry, b: &Geometry) -> Geometry;

    fn area(&self, geometry: &Geometry) -> f64;

    fn centroid(&self, geometry: &Geometry) -> Option<(f64, f64)>;

    /// Bounding box as a polygon
    fn envelope(&self, geometry: &Geometry) -> Option<Geometry>;

    fn point(&self, x: f64, y: f64) -> Geometry;

    fn is_empty(&self, geometry: &Geometry) -> bool;

    fn to_wkt(&self, geometry: &Geometry) -> String;

    fn to_wkb_hex(&self, geometry: &Geometry) -> Result<String>;

    /// Serializes in the requested format
    fn encode(&self, geometry: &Geometry, format: GeometryFormat) -> Result<String> {
        match format {
            GeometryFormat::Wkt => Ok(self.to_wkt(geometry)),
            GeometryFormat::Wkb => self.to_wkb_hex(geometry),
        }
    }

    /// area(a ∩ b) / area(a), zero when `a` has no area
    fn intersect_ratio(&self, a: &Geometry, b: &Geometry) -> f64 {
        let area = self.area(a);
        if area <= 0.0 {
            return 0.0;
        }
        self.area(&self.intersection(a, b)) / area
    }
}
