//! Building placement checks against a confirmed territory

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::claim::ConfirmedTerritory;
use crate::core::config::ClaimConfig;
use crate::core::types::GeoPoint;

/// Whether a building may go at a site
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum PlacementVerdict {
    Legal,
    OutsideTerritory,
    TooCloseToBoundary { distance_m: f64 },
}

impl PlacementVerdict {
    pub fn is_legal(&self) -> bool {
        matches!(self, PlacementVerdict::Legal)
    }
}

/// Stateless site checks; never mutates the territory.
///
/// Holds only the clearance policy, so one instance can be shared across
/// threads checking many sites at once.
#[derive(Debug, Clone, Copy)]
pub struct PlacementValidator {
    clearance_m: f64,
}

impl PlacementValidator {
    pub fn new(config: &ClaimConfig) -> Self {
        Self::with_clearance(config.default_placement_clearance_m)
    }

    pub fn with_clearance(clearance_m: f64) -> Self {
        Self { clearance_m }
    }

    pub fn clearance_m(&self) -> f64 {
        self.clearance_m
    }

    pub fn is_inside(&self, point: &GeoPoint, territory: &ConfirmedTerritory) -> bool {
        territory.polygon().contains(point)
    }

    pub fn is_near_boundary(
        &self,
        point: &GeoPoint,
        territory: &ConfirmedTerritory,
        min_distance_m: f64,
    ) -> bool {
        territory.polygon().boundary_distance(point) < min_distance_m
    }

    pub fn check_site(&self, point: &GeoPoint, territory: &ConfirmedTerritory) -> PlacementVerdict {
        if !self.is_inside(point, territory) {
            return PlacementVerdict::OutsideTerritory;
        }
        let distance_m = territory.polygon().boundary_distance(point);
        if distance_m < self.clearance_m {
            PlacementVerdict::TooCloseToBoundary { distance_m }
        } else {
            PlacementVerdict::Legal
        }
    }

    /// Inside the territory and at least the clearance away from its edge
    pub fn is_legal_site(&self, point: &GeoPoint, territory: &ConfirmedTerritory) -> bool {
        self.check_site(point, territory).is_legal()
    }

    /// Check many sites in parallel; verdicts keep the input order
    pub fn check_sites(
        &self,
        points: &[GeoPoint],
        territory: &ConfirmedTerritory,
    ) -> Vec<PlacementVerdict> {
        points
            .par_iter()
            .map(|p| self.check_site(p, territory))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::GeoPolygon;

    fn origin() -> GeoPoint {
        GeoPoint::new(40.7128, -74.0060)
    }

    fn territory(side: f64) -> ConfirmedTerritory {
        let o = origin();
        let polygon = GeoPolygon::new(vec![
            o,
            o.offset_meters(side, 0.0),
            o.offset_meters(side, side),
            o.offset_meters(0.0, side),
        ])
        .unwrap();
        ConfirmedTerritory::from_polygon(polygon, 0.0)
    }

    #[test]
    fn test_center_is_legal() {
        let t = territory(100.0);
        let v = PlacementValidator::with_clearance(8.0);
        assert_eq!(v.check_site(&origin().offset_meters(50.0, 50.0), &t), PlacementVerdict::Legal);
    }

    #[test]
    fn test_near_edge_rejected() {
        let t = territory(100.0);
        let v = PlacementValidator::with_clearance(8.0);
        let site = origin().offset_meters(50.0, 3.0);
        assert!(v.is_inside(&site, &t));
        assert!(v.is_near_boundary(&site, &t, 8.0));
        match v.check_site(&site, &t) {
            PlacementVerdict::TooCloseToBoundary { distance_m } => {
                assert!((distance_m - 3.0).abs() < 0.01)
            }
            other => panic!("expected boundary rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_outside_rejected() {
        let t = territory(100.0);
        let v = PlacementValidator::with_clearance(8.0);
        assert_eq!(
            v.check_site(&origin().offset_meters(150.0, 50.0), &t),
            PlacementVerdict::OutsideTerritory
        );
    }

    #[test]
    fn test_clearance_is_tunable() {
        let t = territory(100.0);
        let site = origin().offset_meters(50.0, 3.0);
        assert!(PlacementValidator::with_clearance(2.0).is_legal_site(&site, &t));
        assert!(!PlacementValidator::new(&ClaimConfig::default()).is_legal_site(&site, &t));
    }

    #[test]
    fn test_batch_matches_single_checks() {
        let t = territory(100.0);
        let v = PlacementValidator::with_clearance(8.0);
        let sites: Vec<GeoPoint> = (0..40)
            .map(|i| origin().offset_meters(i as f64 * 3.0, 50.0))
            .collect();

        let batch = v.check_sites(&sites, &t);
        let single: Vec<_> = sites.iter().map(|s| v.check_site(s, &t)).collect();
        assert_eq!(batch, single);
    }
}
