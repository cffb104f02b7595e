//! Planar geometry provider backed by `geo`

use geo::{Area, BooleanOps, BoundingRect, Centroid, Intersects};
use geo_types::{Geometry as GeoGeometry, MultiPolygon, Point};
use wkt::ToWkt;

use super::{Geometry, GeometryFormat, GeometryProvider, wkb};
use crate::error::{self, Result};

/// Cartesian geometry operations; coordinates are taken as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarGeometry;

impl PlanarGeometry {
    pub fn new() -> Self {
        Self
    }
}

/// Parse a WKT string into a geo-types geometry
pub fn parse_wkt(text: &str) -> Result<GeoGeometry<f64>> {
    use std::str::FromStr;

    wkt::Wkt::<f64>::from_str(text.trim())
        .map_err(|e| error::geometry_parse_failed(format!("{e:?}")))
        .and_then(|w| {
            w.try_into()
                .map_err(|e: wkt::conversion::Error| error::geometry_parse_failed(format!("{e:?}")))
        })
}

/// Areal part of a geometry; points and lines contribute nothing
fn to_multi_polygon(geometry: &GeoGeometry<f64>) -> MultiPolygon<f64> {
    match geometry {
        GeoGeometry::Polygon(p) => MultiPolygon::new(vec![p.clone()]),
        GeoGeometry::MultiPolygon(mp) => mp.clone(),
        GeoGeometry::Rect(r) => MultiPolygon::new(vec![r.to_polygon()]),
        GeoGeometry::Triangle(t) => MultiPolygon::new(vec![t.to_polygon()]),
        GeoGeometry::GeometryCollection(gc) => MultiPolygon::new(
            gc.iter()
                .flat_map(|g| to_multi_polygon(g).0)
                .collect(),
        ),
        _ => MultiPolygon::new(Vec::new()),
    }
}

impl GeometryProvider for PlanarGeometry {
    fn parse(&self, text: &str, format: GeometryFormat) -> Result<Geometry> {
        let geometry = match format {
            GeometryFormat::Wkt => parse_wkt(text)?,
            GeometryFormat::Wkb => wkb::decode_hex(text)?,
        };
        Ok(Geometry::new(geometry))
    }

    fn intersects(&self, a: &Geometry, b: &Geometry) -> bool {
        a.inner().intersects(b.inner())
    }

    fn intersection(&self, a: &Geometry, b: &Geometry) -> Geometry {
        let result = to_multi_polygon(a.inner()).intersection(&to_multi_polygon(b.inner()));
        Geometry::new(GeoGeometry::MultiPolygon(result))
    }

    fn union(&self, a: &Geometry, b: &Geometry) -> Geometry {
        let result = to_multi_polygon(a.inner()).union(&to_multi_polygon(b.inner()));
        Geometry::new(GeoGeometry::MultiPolygon(result))
    }

    fn area(&self, geometry: &Geometry) -> f64 {
        geometry.inner().unsigned_area()
    }

    fn centroid(&self, geometry: &Geometry) -> Option<(f64, f64)> {
        geometry.inner().centroid().map(|c| (c.x(), c.y()))
    }

    fn envelope(&self, geometry: &Geometry) -> Option<Geometry> {
        geometry
            .inner()
            .bounding_rect()
            .map(|rect| Geometry::new(GeoGeometry::Polygon(rect.to_polygon())))
    }

    fn point(&self, x: f64, y: f64) -> Geometry {
        Geometry::new(GeoGeometry::Point(Point::new(x, y)))
    }

    fn is_empty(&self, geometry: &Geometry) -> bool {
        match geometry.inner() {
            GeoGeometry::MultiPolygon(mp) => mp.0.is_empty(),
            GeoGeometry::MultiPoint(mp) => mp.0.is_empty(),
            GeoGeometry::MultiLineString(ml) => ml.0.is_empty(),
            GeoGeometry::LineString(ls) => ls.0.is_empty(),
            GeoGeometry::GeometryCollection(gc) => gc.0.is_empty(),
            _ => false,
        }
    }

    fn to_wkt(&self, geometry: &Geometry) -> String {
        geometry.inner().wkt_string()
    }

    fn to_wkb_hex(&self, geometry: &Geometry) -> Result<String> {
        wkb::encode_hex(geometry.inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))";
    const SHIFTED: &str = "POLYGON((1 0, 3 0, 3 2, 1 2, 1 0))";
    const FAR: &str = "POLYGON((10 10, 11 10, 11 11, 10 11, 10 10))";

    fn geom(text: &str) -> Geometry {
        PlanarGeometry.parse(text, GeometryFormat::Wkt).unwrap()
    }

    #[test]
    fn test_parse_invalid_wkt() {
        assert!(PlanarGeometry.parse("POLYGON((0 0, 1", GeometryFormat::Wkt).is_err());
    }

    #[test]
    fn test_area_and_centroid() {
        let g = geom(SQUARE);
        assert!((PlanarGeometry.area(&g) - 4.0).abs() < 1e-12);
        assert_eq!(PlanarGeometry.centroid(&g), Some((1.0, 1.0)));
    }

    #[test]
    fn test_intersection_ratio() {
        let a = geom(SQUARE);
        let b = geom(SHIFTED);
        assert!(PlanarGeometry.intersects(&a, &b));
        assert!((PlanarGeometry.intersect_ratio(&a, &b) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint() {
        let a = geom(SQUARE);
        let b = geom(FAR);
        assert!(!PlanarGeometry.intersects(&a, &b));
        assert!(PlanarGeometry.is_empty(&PlanarGeometry.intersection(&a, &b)));
        assert_eq!(PlanarGeometry.intersect_ratio(&a, &b), 0.0);
    }

    #[test]
    fn test_union_area() {
        let u = PlanarGeometry.union(&geom(SQUARE), &geom(SHIFTED));
        assert!((PlanarGeometry.area(&u) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_envelope() {
        let g = geom("POLYGON((0 0, 4 1, 0 3, 0 0))");
        let env = PlanarGeometry.envelope(&g).unwrap();
        assert!((PlanarGeometry.area(&env) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_wkt_output_parses_back() {
        let g = geom(SQUARE);
        let text = PlanarGeometry.to_wkt(&g);
        assert!(text.starts_with("POLYGON"));
        assert!((PlanarGeometry.area(&geom(&text)) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(GeometryFormat::from_name("WKB").unwrap(), GeometryFormat::Wkb);
        assert!(GeometryFormat::from_name("gml").is_err());
    }
}
