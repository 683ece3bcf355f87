//! Closed-path validation: vertex count, self-intersection, area, slivers

use serde::{Deserialize, Serialize};

use crate::core::config::ClaimConfig;
use crate::core::types::GeoPoint;
use crate::spatial::geo_math::{self, AreaMethod};
use crate::spatial::MIN_POLYGON_VERTICES;
use crate::tracking::CandidatePolygon;

/// Why a closed path was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    InsufficientPoints,
    SelfIntersecting,
    AreaTooSmall,
    BoundaryTooClose,
}

impl FailureReason {
    /// Player-facing hint for correcting the walk
    pub fn hint(&self) -> &'static str {
        match self {
            FailureReason::InsufficientPoints => "Not enough of your path was recorded. Keep walking.",
            FailureReason::SelfIntersecting => "Your path crosses itself. Avoid crossing your own trail.",
            FailureReason::AreaTooSmall => "The enclosed area is too small. Walk a wider loop.",
            FailureReason::BoundaryTooClose => {
                "Parts of your boundary run too close together. Walk a rounder shape."
            }
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureReason::InsufficientPoints => "insufficient points",
            FailureReason::SelfIntersecting => "self-intersecting",
            FailureReason::AreaTooSmall => "area too small",
            FailureReason::BoundaryTooClose => "boundary too close",
        };
        f.write_str(name)
    }
}

/// Exactly one outcome per validation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ValidationResult {
    Passed { area_m2: f64, perimeter_m: f64 },
    Failed(FailureReason),
}

impl ValidationResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, ValidationResult::Passed { .. })
    }

    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            ValidationResult::Failed(reason) => Some(*reason),
            ValidationResult::Passed { .. } => None,
        }
    }
}

/// Runs the ordered polygon checks, stopping at the first failure
#[derive(Debug, Clone)]
pub struct PolygonValidator {
    min_area_m2: f64,
    min_boundary_spacing_m: f64,
    area_method: AreaMethod,
}

impl PolygonValidator {
    pub fn new(config: &ClaimConfig) -> Self {
        Self {
            min_area_m2: config.min_area_m2,
            min_boundary_spacing_m: config.min_boundary_spacing_m,
            area_method: config.area_method,
        }
    }

    pub fn validate(&self, candidate: &CandidatePolygon) -> ValidationResult {
        self.validate_vertices(candidate.vertices())
    }

    /// Validate a raw, implicitly closed vertex ring
    pub fn validate_vertices(&self, vertices: &[GeoPoint]) -> ValidationResult {
        if vertices.len() < MIN_POLYGON_VERTICES {
            return ValidationResult::Failed(FailureReason::InsufficientPoints);
        }

        if geo_math::self_intersects(vertices) {
            return ValidationResult::Failed(FailureReason::SelfIntersecting);
        }

        let area_m2 = geo_math::polygon_area_with(vertices, self.area_method);
        if area_m2 < self.min_area_m2 {
            tracing::debug!(
                "Area {:.1} m² below minimum {:.1} m²",
                area_m2,
                self.min_area_m2
            );
            return ValidationResult::Failed(FailureReason::AreaTooSmall);
        }

        if let Some(conflict) = self.find_boundary_conflict(vertices) {
            tracing::debug!(
                "Vertex {} is {:.2} m from {:?}",
                conflict.vertex,
                conflict.distance_m,
                conflict.other
            );
            return ValidationResult::Failed(FailureReason::BoundaryTooClose);
        }

        ValidationResult::Passed {
            area_m2,
            perimeter_m: geo_math::perimeter(vertices),
        }
    }

    /// Find a vertex that comes too close to a non-adjacent vertex or edge.
    ///
    /// Two parts of the ring are adjacent when they share a vertex or when
    /// the shorter boundary arc between them is within twice the spacing.
    fn find_boundary_conflict(&self, vertices: &[GeoPoint]) -> Option<BoundaryConflict> {
        let n = vertices.len();
        let spacing = self.min_boundary_spacing_m;
        let neighbourhood = 2.0 * spacing;

        // Arc position of each vertex along the ring
        let mut arc = Vec::with_capacity(n);
        let mut perimeter = 0.0;
        for i in 0..n {
            arc.push(perimeter);
            perimeter += vertices[i].distance_to(&vertices[(i + 1) % n]);
        }
        let arc_between = |i: usize, j: usize| {
            let d = (arc[i] - arc[j]).abs();
            d.min(perimeter - d)
        };

        for i in 0..n {
            for j in (i + 1)..n {
                let index_adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if index_adjacent || arc_between(i, j) <= neighbourhood {
                    continue;
                }
                let distance_m = vertices[i].distance_to(&vertices[j]);
                if distance_m < spacing {
                    return Some(BoundaryConflict {
                        vertex: i,
                        other: BoundaryPart::Vertex(j),
                        distance_m,
                    });
                }
            }

            for k in 0..n {
                let k2 = (k + 1) % n;
                if k == i || k2 == i {
                    continue; // incident edge
                }
                if arc_between(i, k).min(arc_between(i, k2)) <= neighbourhood {
                    continue;
                }
                let distance_m =
                    geo_math::distance_point_to_segment(&vertices[i], &vertices[k], &vertices[k2]);
                if distance_m < spacing {
                    return Some(BoundaryConflict {
                        vertex: i,
                        other: BoundaryPart::Edge(k, k2),
                        distance_m,
                    });
                }
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy)]
enum BoundaryPart {
    Vertex(usize),
    Edge(usize, usize),
}

#[derive(Debug, Clone, Copy)]
struct BoundaryConflict {
    vertex: usize,
    other: BoundaryPart,
    distance_m: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> GeoPoint {
        GeoPoint::new(-33.8688, 151.2093)
    }

    fn validator() -> PolygonValidator {
        PolygonValidator::new(&ClaimConfig::default())
    }

    fn ring(offsets: &[(f64, f64)]) -> Vec<GeoPoint> {
        let o = origin();
        offsets.iter().map(|&(e, n)| o.offset_meters(e, n)).collect()
    }

    #[test]
    fn test_two_vertices_insufficient() {
        let result = validator().validate_vertices(&ring(&[(0.0, 0.0), (50.0, 0.0)]));
        assert_eq!(result, ValidationResult::Failed(FailureReason::InsufficientPoints));
    }

    #[test]
    fn test_square_passes_with_area_and_perimeter() {
        let result = validator().validate_vertices(&ring(&[
            (0.0, 0.0),
            (40.0, 0.0),
            (40.0, 40.0),
            (0.0, 40.0),
        ]));
        match result {
            ValidationResult::Passed { area_m2, perimeter_m } => {
                assert!((area_m2 - 1600.0).abs() < 1.0);
                assert!((perimeter_m - 160.0).abs() < 0.1);
            }
            other => panic!("expected pass, got {:?}", other),
        }
    }

    #[test]
    fn test_bowtie_fails_before_area() {
        let result = validator().validate_vertices(&ring(&[
            (0.0, 0.0),
            (40.0, 40.0),
            (40.0, 0.0),
            (0.0, 40.0),
        ]));
        assert_eq!(result, ValidationResult::Failed(FailureReason::SelfIntersecting));
    }

    #[test]
    fn test_small_square_area_too_small() {
        let result = validator().validate_vertices(&ring(&[
            (0.0, 0.0),
            (8.0, 0.0),
            (8.0, 8.0),
            (0.0, 8.0),
        ]));
        assert_eq!(result, ValidationResult::Failed(FailureReason::AreaTooSmall));
    }

    #[test]
    fn test_sliver_boundary_too_close() {
        // Two long lobes joined by a 1 m wide neck: large area, no crossing
        let result = validator().validate_vertices(&ring(&[
            (0.0, 0.0),
            (30.0, 0.0),
            (30.0, 14.5),
            (60.0, 14.5),
            (60.0, 0.0),
            (90.0, 0.0),
            (90.0, 30.0),
            (60.0, 30.0),
            (60.0, 15.5),
            (30.0, 15.5),
            (30.0, 30.0),
            (0.0, 30.0),
        ]));
        assert_eq!(result, ValidationResult::Failed(FailureReason::BoundaryTooClose));
    }

    #[test]
    fn test_dense_straight_sampling_is_not_sliver() {
        // 1.5 m sampling along every side of a 30 m square
        let mut offsets = Vec::new();
        let steps = 20;
        for k in 0..steps {
            offsets.push((k as f64 * 1.5, 0.0));
        }
        for k in 0..steps {
            offsets.push((30.0, k as f64 * 1.5));
        }
        for k in 0..steps {
            offsets.push((30.0 - k as f64 * 1.5, 30.0));
        }
        for k in 0..steps {
            offsets.push((0.0, 30.0 - k as f64 * 1.5));
        }
        let result = validator().validate_vertices(&ring(&offsets));
        assert!(result.is_passed(), "got {:?}", result);
    }

    #[test]
    fn test_failure_reason_accessors() {
        let failed = ValidationResult::Failed(FailureReason::AreaTooSmall);
        assert!(!failed.is_passed());
        assert_eq!(failed.failure(), Some(FailureReason::AreaTooSmall));
        assert!(!FailureReason::AreaTooSmall.hint().is_empty());
        assert_eq!(FailureReason::SelfIntersecting.to_string(), "self-intersecting");
    }
}
