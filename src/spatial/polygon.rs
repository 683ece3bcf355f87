//! Immutable polygon ring over geographic points

use serde::{Deserialize, Serialize};

use super::geo_math::{self, AreaMethod};
use crate::core::error::{ClaimError, Result};
use crate::core::types::GeoPoint;

/// Minimum vertex count for a polygon
pub const MIN_POLYGON_VERTICES: usize = 3;

/// An ordered, implicitly closed ring of at least three vertices.
///
/// The closing edge from the last vertex back to the first is never stored.
/// A trailing vertex equal to the first is dropped on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GeoPoint>", into = "Vec<GeoPoint>")]
pub struct GeoPolygon {
    vertices: Vec<GeoPoint>,
}

impl GeoPolygon {
    pub fn new(mut vertices: Vec<GeoPoint>) -> Result<Self> {
        if vertices.len() > 1 {
            if let (Some(first), Some(last)) = (vertices.first(), vertices.last()) {
                if first.same_position(last) {
                    vertices.pop();
                }
            }
        }

        if vertices.len() < MIN_POLYGON_VERTICES {
            return Err(ClaimError::DegeneratePolygon {
                count: vertices.len(),
                minimum: MIN_POLYGON_VERTICES,
            });
        }

        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Strict interior test; boundary points are outside
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.bounds().contains(point) && geo_math::point_in_polygon(point, &self.vertices)
    }

    pub fn boundary_distance(&self, point: &GeoPoint) -> f64 {
        geo_math::min_distance_to_polygon_boundary(point, &self.vertices)
    }

    pub fn area(&self, method: AreaMethod) -> f64 {
        geo_math::polygon_area_with(&self.vertices, method)
    }

    pub fn perimeter(&self) -> f64 {
        geo_math::perimeter(&self.vertices)
    }

    pub fn self_intersects(&self) -> bool {
        geo_math::self_intersects(&self.vertices)
    }

    pub fn bounds(&self) -> GeoBounds {
        GeoBounds::from_points(&self.vertices)
    }

    /// Mean of the vertices (not the area centroid)
    pub fn centroid(&self) -> GeoPoint {
        let n = self.vertices.len() as f64;
        let (lat, lon) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(lat, lon), v| (lat + v.latitude, lon + v.longitude));
        GeoPoint::new(lat / n, lon / n)
    }
}

impl TryFrom<Vec<GeoPoint>> for GeoPolygon {
    type Error = ClaimError;

    fn try_from(vertices: Vec<GeoPoint>) -> Result<Self> {
        Self::new(vertices)
    }
}

impl From<GeoPolygon> for Vec<GeoPoint> {
    fn from(polygon: GeoPolygon) -> Self {
        polygon.vertices
    }
}

/// Latitude/longitude bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub fn from_points(points: &[GeoPoint]) -> Self {
        points.iter().fold(
            Self {
                min_lat: f64::INFINITY,
                max_lat: f64::NEG_INFINITY,
                min_lon: f64::INFINITY,
                max_lon: f64::NEG_INFINITY,
            },
            |b, p| Self {
                min_lat: b.min_lat.min(p.latitude),
                max_lat: b.max_lat.max(p.latitude),
                min_lon: b.min_lon.min(p.longitude),
                max_lon: b.max_lon.max(p.longitude),
            },
        )
    }

    /// A box wider than half the globe is taken to wrap through ±180°,
    /// spanning from `max_lon` east to `min_lon`
    pub fn crosses_antimeridian(&self) -> bool {
        self.max_lon - self.min_lon > 180.0
    }

    /// Inclusive containment
    pub fn contains(&self, point: &GeoPoint) -> bool {
        let lat_ok = point.latitude >= self.min_lat && point.latitude <= self.max_lat;
        let lon_ok = if self.crosses_antimeridian() {
            point.longitude >= self.max_lon || point.longitude <= self.min_lon
        } else {
            point.longitude >= self.min_lon && point.longitude <= self.max_lon
        };
        lat_ok && lon_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Vec<GeoPoint> {
        let o = GeoPoint::new(51.5074, -0.1278);
        vec![
            o,
            o.offset_meters(side, 0.0),
            o.offset_meters(side, side),
            o.offset_meters(0.0, side),
        ]
    }

    #[test]
    fn test_rejects_two_vertices() {
        let err = GeoPolygon::new(square(10.0)[..2].to_vec()).unwrap_err();
        assert!(matches!(
            err,
            ClaimError::DegeneratePolygon { count: 2, minimum: 3 }
        ));
    }

    #[test]
    fn test_drops_explicit_closing_vertex() {
        let mut ring = square(10.0);
        ring.push(ring[0]);
        let polygon = GeoPolygon::new(ring).unwrap();
        assert_eq!(polygon.vertex_count(), 4);
    }

    #[test]
    fn test_closed_triangle_is_degenerate() {
        let sq = square(10.0);
        let ring = vec![sq[0], sq[1], sq[0]];
        assert!(GeoPolygon::new(ring).is_err());
    }

    #[test]
    fn test_deserialize_enforces_minimum() {
        let json = r#"[{"latitude": 0.0, "longitude": 0.0}, {"latitude": 1.0, "longitude": 1.0}]"#;
        assert!(serde_json::from_str::<GeoPolygon>(json).is_err());
    }

    #[test]
    fn test_json_is_plain_vertex_list() {
        let polygon = GeoPolygon::new(square(10.0)).unwrap();
        let json = serde_json::to_string(&polygon).unwrap();
        let back: GeoPolygon = serde_json::from_str(&json).unwrap();
        assert_eq!(back, polygon);
        assert!(json.starts_with('['));
    }

    #[test]
    fn test_centroid_inside_convex_polygon() {
        let polygon = GeoPolygon::new(square(60.0)).unwrap();
        assert!(polygon.contains(&polygon.centroid()));
    }

    fn antimeridian_square() -> GeoPolygon {
        GeoPolygon::new(vec![
            GeoPoint::new(0.0, 179.9995),
            GeoPoint::new(0.0, -179.9995),
            GeoPoint::new(0.001, -179.9995),
            GeoPoint::new(0.001, 179.9995),
        ])
        .unwrap()
    }

    #[test]
    fn test_contains_across_antimeridian() {
        let polygon = antimeridian_square();
        assert!(polygon.bounds().crosses_antimeridian());

        // Both sides of the date line are inside
        assert!(polygon.contains(&GeoPoint::new(0.0005, -179.9998)));
        assert!(polygon.contains(&GeoPoint::new(0.0005, 179.9999)));
        assert!(!polygon.contains(&GeoPoint::new(0.0005, 0.0)));
        assert!(!polygon.contains(&GeoPoint::new(0.0005, -179.9)));
    }

    #[test]
    fn test_area_across_antimeridian() {
        let polygon = antimeridian_square();
        // About 111 m on each side at the equator
        let planar = polygon.area(AreaMethod::Planar);
        let geodesic = polygon.area(AreaMethod::Geodesic);
        assert!((planar - 12_364.0).abs() < 150.0, "planar {}", planar);
        assert!((geodesic - planar).abs() / planar < 0.01, "geodesic {}", geodesic);
    }

    #[test]
    fn test_bounds_fast_reject() {
        let polygon = GeoPolygon::new(square(60.0)).unwrap();
        let bounds = polygon.bounds();
        let outside = polygon.vertices()[0].offset_meters(-5.0, 30.0);
        assert!(!bounds.contains(&outside));
        assert!(!polygon.contains(&outside));
    }
}
