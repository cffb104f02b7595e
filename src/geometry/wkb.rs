//! Hex-encoded well-known binary (2-D only)

use geo_types::{
    Coord, Geometry as GeoGeometry, GeometryCollection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};

use crate::error::{self, Result};

const POINT: u32 = 1;
const LINE_STRING: u32 = 2;
const POLYGON: u32 = 3;
const MULTI_POINT: u32 = 4;
const MULTI_LINE_STRING: u32 = 5;
const MULTI_POLYGON: u32 = 6;
const COLLECTION: u32 = 7;

/// EWKB flag: an SRID follows the type word
const EWKB_SRID: u32 = 0x2000_0000;
const EWKB_Z: u32 = 0x8000_0000;
const EWKB_M: u32 = 0x4000_0000;

pub fn decode_hex(text: &str) -> Result<GeoGeometry<f64>> {
    let bytes = hex::decode(text.trim())
        .map_err(|e| error::geometry_parse_failed(format!("invalid hex WKB: {e}")))?;
    let mut reader = Reader {
        bytes: &bytes,
        pos: 0,
        little_endian: true,
    };
    reader.geometry()
}

pub fn encode_hex(geometry: &GeoGeometry<f64>) -> Result<String> {
    let mut out = Vec::new();
    write_geometry(&mut out, geometry)?;
    Ok(hex::encode_upper(out))
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    little_endian: bool,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.pos + N;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| error::geometry_parse_failed("truncated WKB"))?;
        self.pos = end;
        let mut buf = [0u8; N];
        buf.copy_from_slice(slice);
        Ok(buf)
    }

    fn u32(&mut self) -> Result<u32> {
        let buf = self.take::<4>()?;
        Ok(if self.little_endian {
            u32::from_le_bytes(buf)
        } else {
            u32::from_be_bytes(buf)
        })
    }

    fn f64(&mut self) -> Result<f64> {
        let buf = self.take::<8>()?;
        Ok(if self.little_endian {
            f64::from_le_bytes(buf)
        } else {
            f64::from_be_bytes(buf)
        })
    }

    fn coord(&mut self) -> Result<Coord<f64>> {
        Ok(Coord {
            x: self.f64()?,
            y: self.f64()?,
        })
    }

    fn line_string(&mut self) -> Result<LineString<f64>> {
        let count = self.u32()?;
        let coords = (0..count)
            .map(|_| self.coord())
            .collect::<Result<Vec<_>>>()?;
        Ok(LineString::new(coords))
    }

    fn polygon(&mut self) -> Result<Polygon<f64>> {
        let rings = self.u32()?;
        if rings == 0 {
            return Ok(Polygon::new(LineString::new(Vec::new()), Vec::new()));
        }
        let exterior = self.line_string()?;
        let interiors = (1..rings)
            .map(|_| self.line_string())
            .collect::<Result<Vec<_>>>()?;
        Ok(Polygon::new(exterior, interiors))
    }

    fn header(&mut self) -> Result<u32> {
        let [order] = self.take::<1>()?;
        self.little_endian = match order {
            0 => false,
            1 => true,
            other => {
                return Err(error::geometry_parse_failed(format!(
                    "invalid WKB byte order marker {other}"
                )));
            }
        };
        let kind = self.u32()?;
        if (kind & (EWKB_Z | EWKB_M)) != 0 || (kind > 1000 && (kind & EWKB_SRID) == 0) {
            return Err(error::geometry_parse_failed(
                "only 2-D WKB geometries are supported",
            ));
        }
        if kind & EWKB_SRID != 0 {
            self.u32()?;
        }
        Ok(kind & !EWKB_SRID)
    }

    fn geometry(&mut self) -> Result<GeoGeometry<f64>> {
        let geometry = match self.header()? {
            POINT => GeoGeometry::Point(Point::from(self.coord()?)),
            LINE_STRING => GeoGeometry::LineString(self.line_string()?),
            POLYGON => GeoGeometry::Polygon(self.polygon()?),
            MULTI_POINT => {
                let count = self.u32()?;
                let mut points = Vec::new();
                for _ in 0..count {
                    match self.geometry()? {
                        GeoGeometry::Point(p) => points.push(p),
                        _ => return Err(error::geometry_parse_failed("MULTIPOINT member is not a point")),
                    }
                }
                GeoGeometry::MultiPoint(MultiPoint::new(points))
            }
            MULTI_LINE_STRING => {
                let count = self.u32()?;
                let mut lines = Vec::new();
                for _ in 0..count {
                    match self.geometry()? {
                        GeoGeometry::LineString(l) => lines.push(l),
                        _ => return Err(error::geometry_parse_failed("MULTILINESTRING member is not a line")),
                    }
                }
                GeoGeometry::MultiLineString(MultiLineString::new(lines))
            }
            MULTI_POLYGON => {
                let count = self.u32()?;
                let mut polygons = Vec::new();
                for _ in 0..count {
                    match self.geometry()? {
                        GeoGeometry::Polygon(p) => polygons.push(p),
                        _ => return Err(error::geometry_parse_failed("MULTIPOLYGON member is not a polygon")),
                    }
                }
                GeoGeometry::MultiPolygon(MultiPolygon::new(polygons))
            }
            COLLECTION => {
                let count = self.u32()?;
                let members = (0..count)
                    .map(|_| self.geometry())
                    .collect::<Result<Vec<_>>>()?;
                GeoGeometry::GeometryCollection(GeometryCollection::new_from(members))
            }
            other => {
                return Err(error::geometry_parse_failed(format!(
                    "unsupported WKB geometry type {other}"
                )));
            }
        };
        Ok(geometry)
    }
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_coord(out: &mut Vec<u8>, coord: Coord<f64>) {
    out.extend_from_slice(&coord.x.to_le_bytes());
    out.extend_from_slice(&coord.y.to_le_bytes());
}

fn put_header(out: &mut Vec<u8>, kind: u32) {
    out.push(1);
    put_u32(out, kind);
}

fn put_ring(out: &mut Vec<u8>, ring: &LineString<f64>) {
    put_u32(out, u32::try_from(ring.0.len()).unwrap_or(u32::MAX));
    for coord in &ring.0 {
        put_coord(out, *coord);
    }
}

fn put_polygon_body(out: &mut Vec<u8>, polygon: &Polygon<f64>) {
    if polygon.exterior().0.is_empty() {
        put_u32(out, 0);
        return;
    }
    put_u32(out, u32::try_from(1 + polygon.interiors().len()).unwrap_or(u32::MAX));
    put_ring(out, polygon.exterior());
    for ring in polygon.interiors() {
        put_ring(out, ring);
    }
}

fn put_count(out: &mut Vec<u8>, count: usize) {
    put_u32(out, u32::try_from(count).unwrap_or(u32::MAX));
}

fn write_geometry(out: &mut Vec<u8>, geometry: &GeoGeometry<f64>) -> Result<()> {
    match geometry {
        GeoGeometry::Point(p) => {
            put_header(out, POINT);
            put_coord(out, p.0);
        }
        GeoGeometry::Line(l) => {
            put_header(out, LINE_STRING);
            put_ring(out, &LineString::new(vec![l.start, l.end]));
        }
        GeoGeometry::LineString(ls) => {
            put_header(out, LINE_STRING);
            put_ring(out, ls);
        }
        GeoGeometry::Polygon(p) => {
            put_header(out, POLYGON);
            put_polygon_body(out, p);
        }
        GeoGeometry::Rect(r) => {
            put_header(out, POLYGON);
            put_polygon_body(out, &r.to_polygon());
        }
        GeoGeometry::Triangle(t) => {
            put_header(out, POLYGON);
            put_polygon_body(out, &t.to_polygon());
        }
        GeoGeometry::MultiPoint(mp) => {
            put_header(out, MULTI_POINT);
            put_count(out, mp.0.len());
            for p in &mp.0 {
                put_header(out, POINT);
                put_coord(out, p.0);
            }
        }
        GeoGeometry::MultiLineString(ml) => {
            put_header(out, MULTI_LINE_STRING);
            put_count(out, ml.0.len());
            for ls in &ml.0 {
                put_header(out, LINE_STRING);
                put_ring(out, ls);
            }
        }
        GeoGeometry::MultiPolygon(mp) => {
            put_header(out, MULTI_POLYGON);
            put_count(out, mp.0.len());
            for p in &mp.0 {
                put_header(out, POLYGON);
                put_polygon_body(out, p);
            }
        }
        GeoGeometry::GeometryCollection(gc) => {
            put_header(out, COLLECTION);
            put_count(out, gc.0.len());
            for member in &gc.0 {
                write_geometry(out, member)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // POINT(1 2), little endian
    const POINT_HEX: &str = "0101000000000000000000F03F0000000000000040";

    #[test]
    fn test_decode_point() {
        let g = decode_hex(POINT_HEX).unwrap();
        assert_eq!(g, GeoGeometry::Point(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_decode_big_endian_point() {
        let g = decode_hex("00000000013FF00000000000004000000000000000").unwrap();
        assert_eq!(g, GeoGeometry::Point(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_encode_point_matches_reference() {
        let hex = encode_hex(&GeoGeometry::Point(Point::new(1.0, 2.0))).unwrap();
        assert_eq!(hex, POINT_HEX);
    }

    #[test]
    fn test_polygon_survives_encoding() {
        let polygon = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            Vec::new(),
        );
        let geometry = GeoGeometry::MultiPolygon(MultiPolygon::new(vec![polygon]));
        let decoded = decode_hex(&encode_hex(&geometry).unwrap()).unwrap();
        assert_eq!(decoded, geometry);
    }

    #[test]
    fn test_truncated_input() {
        assert!(decode_hex("01010000").is_err());
        assert!(decode_hex("zz").is_err());
    }
}
