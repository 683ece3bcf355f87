//! Geometric primitives over geographic coordinates
//!
//! Every function here is pure: no state, no I/O, identical output for
//! identical input. Distances are metres, areas square metres.
//!
//! Planar work (shoelace, orientation tests, projections onto segments) runs
//! in a local equirectangular frame. At the tens-to-hundreds of metres scale
//! a territory is walked at, the distortion is far below GPS noise.
//! Point-to-point distances use the haversine formula from `geo`.

use geo::ChamberlainDuquetteArea;
use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::types::GeoPoint;

/// Mean earth radius in metres (the radius `geo` uses for haversine)
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * PI / 180.0;

/// Points closer than this to an edge are on the boundary, and the boundary
/// counts as outside.
pub const BOUNDARY_EPSILON_M: f64 = 1e-6;

/// How polygon area is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaMethod {
    /// Shoelace formula on the local equirectangular projection
    #[default]
    Planar,
    /// Spherical-excess ring area (Chamberlain-Duquette)
    Geodesic,
}

/// Local east/north metre frame anchored at an origin point
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    origin_lat: f64,
    origin_lon: f64,
    meters_per_deg_lon: f64,
}

impl LocalFrame {
    /// Frame anchored at `origin`, scaled at the origin's latitude
    pub fn new(origin: &GeoPoint) -> Self {
        Self::with_reference_latitude(origin, origin.latitude)
    }

    /// Frame anchored at the first point, scaled at the mean latitude
    pub fn for_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let mean_lat = points.iter().map(|p| p.latitude).sum::<f64>() / points.len() as f64;
        Some(Self::with_reference_latitude(first, mean_lat))
    }

    fn with_reference_latitude(origin: &GeoPoint, reference_lat: f64) -> Self {
        Self {
            origin_lat: origin.latitude,
            origin_lon: origin.longitude,
            meters_per_deg_lon: METERS_PER_DEGREE * reference_lat.to_radians().cos(),
        }
    }

    /// Project to (east, north) metres relative to the origin
    pub fn project(&self, p: &GeoPoint) -> Coord<f64> {
        Coord {
            x: wrap_longitude_delta(p.longitude - self.origin_lon) * self.meters_per_deg_lon,
            y: (p.latitude - self.origin_lat) * METERS_PER_DEGREE,
        }
    }

    /// Inverse of [`LocalFrame::project`]
    pub fn unproject(&self, east_m: f64, north_m: f64) -> GeoPoint {
        let lon_scale = if self.meters_per_deg_lon.abs() > f64::EPSILON {
            self.meters_per_deg_lon
        } else {
            f64::EPSILON
        };
        GeoPoint::new(
            self.origin_lat + north_m / METERS_PER_DEGREE,
            wrap_longitude_delta(self.origin_lon + east_m / lon_scale),
        )
    }

    fn project_all(&self, points: &[GeoPoint]) -> Vec<Coord<f64>> {
        points.iter().map(|p| self.project(p)).collect()
    }
}

fn wrap_longitude_delta(delta: f64) -> f64 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Consecutive edges of a ring, including the closing edge
fn ring_edges<T: Copy>(ring: &[T]) -> impl Iterator<Item = (T, T)> + '_ {
    let n = ring.len();
    (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
}

/// Even-odd ray casting test.
///
/// Polygons with fewer than 3 vertices contain nothing. Points on the
/// boundary (within [`BOUNDARY_EPSILON_M`]) are outside.
pub fn point_in_polygon(point: &GeoPoint, polygon: &[GeoPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    // Frame centred on the query point: the ray runs along +x from the origin
    let frame = LocalFrame::new(point);
    let ring = frame.project_all(polygon);
    let origin = Coord { x: 0.0, y: 0.0 };

    if ring_edges(&ring).any(|(a, b)| planar_segment_distance(origin, a, b) <= BOUNDARY_EPSILON_M) {
        return false;
    }

    let mut inside = false;
    for (a, b) in ring_edges(&ring) {
        if (a.y > 0.0) != (b.y > 0.0) {
            let x_cross = a.x + (0.0 - a.y) * (b.x - a.x) / (b.y - a.y);
            if x_cross > 0.0 {
                inside = !inside;
            }
        }
    }
    inside
}

/// Distance in metres from `point` to the segment `a`-`b`.
///
/// The point is projected onto the segment in the local frame
/// (`t = clamp01(dot / |ab|²)`), then the haversine distance to that
/// projection is returned.
pub fn distance_point_to_segment(point: &GeoPoint, a: &GeoPoint, b: &GeoPoint) -> f64 {
    if a.same_position(b) {
        return point.distance_to(a);
    }

    let frame = LocalFrame::new(point);
    let pa = frame.project(a);
    let pb = frame.project(b);
    let t = closest_parameter(Coord { x: 0.0, y: 0.0 }, pa, pb);
    let projected = frame.unproject(pa.x + t * (pb.x - pa.x), pa.y + t * (pb.y - pa.y));
    point.distance_to(&projected)
}

/// Minimum distance in metres from `point` to any edge of `polygon`.
///
/// An empty polygon is infinitely far away.
pub fn min_distance_to_polygon_boundary(point: &GeoPoint, polygon: &[GeoPoint]) -> f64 {
    match polygon.len() {
        0 => f64::INFINITY,
        1 => point.distance_to(&polygon[0]),
        _ => ring_edges(polygon)
            .map(|(a, b)| distance_point_to_segment(point, &a, &b))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Planar polygon area in square metres (absolute value)
pub fn polygon_area(polygon: &[GeoPoint]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let Some(frame) = LocalFrame::for_points(polygon) else {
        return 0.0;
    };
    let ring = frame.project_all(polygon);

    let mut sum = 0.0;
    for (a, b) in ring_edges(&ring) {
        sum += a.x * b.y - b.x * a.y;
    }
    (sum / 2.0).abs()
}

/// Polygon area in square metres using the requested method
pub fn polygon_area_with(polygon: &[GeoPoint], method: AreaMethod) -> f64 {
    match method {
        AreaMethod::Planar => polygon_area(polygon),
        AreaMethod::Geodesic => geodesic_area(polygon),
    }
}

fn geodesic_area(polygon: &[GeoPoint]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    // Unwrapped relative to the first vertex so rings across ±180° stay contiguous
    let lon0 = polygon[0].longitude;
    let mut coords: Vec<(f64, f64)> = polygon
        .iter()
        .map(|p| (lon0 + wrap_longitude_delta(p.longitude - lon0), p.latitude))
        .collect();
    // Close the ring
    coords.push(coords[0]);
    Polygon::new(LineString::from(coords), vec![]).chamberlain_duquette_unsigned_area()
}

/// Sum of edge lengths in metres, including the closing edge
pub fn perimeter(polygon: &[GeoPoint]) -> f64 {
    if polygon.len() < 2 {
        return 0.0;
    }
    ring_edges(polygon).map(|(a, b)| a.distance_to(&b)).sum()
}

/// Length in metres of an open path
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Check whether any two non-adjacent edges touch or cross
pub fn self_intersects(polygon: &[GeoPoint]) -> bool {
    let n = polygon.len();
    if n < 4 {
        return false; // Triangle can't self-intersect
    }
    let Some(frame) = LocalFrame::for_points(polygon) else {
        return false;
    };
    let ring = frame.project_all(polygon);

    for i in 0..n {
        let a1 = ring[i];
        let a2 = ring[(i + 1) % n];

        for j in (i + 2)..n {
            // Skip adjacent edges
            if j == (i + n - 1) % n {
                continue;
            }

            let b1 = ring[j];
            let b2 = ring[(j + 1) % n];

            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// Segment intersection via orientation signs, counting touching and
/// collinear overlap as intersecting
fn segments_intersect(a1: Coord<f64>, a2: Coord<f64>, b1: Coord<f64>, b2: Coord<f64>) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && within_box(b1, b2, a1))
        || (d2 == 0.0 && within_box(b1, b2, a2))
        || (d3 == 0.0 && within_box(a1, a2, b1))
        || (d4 == 0.0 && within_box(a1, a2, b2))
}

fn cross(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn within_box(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn closest_parameter(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= 0.0 {
        return 0.0;
    }
    let ap = p - a;
    ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0)
}

fn planar_segment_distance(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let t = closest_parameter(p, a, b);
    let dx = a.x + t * (b.x - a.x) - p.x;
    let dy = a.y + t * (b.y - a.y) - p.y;
    (dx * dx + dy * dy).sqrt()
}
