//! The confirmed territory handed to persistence

use serde::{Deserialize, Serialize};

use crate::core::types::{GeoPoint, TerritoryId, Timestamp};
use crate::spatial::{AreaMethod, GeoPolygon};
use crate::tracking::CandidatePolygon;

/// A validated polygon the player explicitly accepted.
///
/// Immutable once built. The engine hands it out exactly once per
/// confirmation and keeps no copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedTerritory {
    id: TerritoryId,
    polygon: GeoPolygon,
    area_m2: f64,
    perimeter_m: f64,
    started_at: Option<Timestamp>,
    closed_at: Option<Timestamp>,
    confirmed_at: Timestamp,
}

impl ConfirmedTerritory {
    pub(crate) fn from_candidate(
        candidate: CandidatePolygon,
        area_m2: f64,
        perimeter_m: f64,
        confirmed_at: Timestamp,
    ) -> Self {
        let started_at = candidate.started_at();
        let closed_at = candidate.closed_at();
        Self {
            id: TerritoryId::new(),
            polygon: candidate.into_polygon(),
            area_m2,
            perimeter_m,
            started_at,
            closed_at,
            confirmed_at,
        }
    }

    /// Rebuild a territory from a stored polygon, e.g. one fetched back from
    /// persistence for building placement. Area is measured planar.
    pub fn from_polygon(polygon: GeoPolygon, confirmed_at: Timestamp) -> Self {
        Self {
            id: TerritoryId::new(),
            area_m2: polygon.area(AreaMethod::Planar),
            perimeter_m: polygon.perimeter(),
            polygon,
            started_at: None,
            closed_at: None,
            confirmed_at,
        }
    }

    pub fn id(&self) -> TerritoryId {
        self.id
    }

    pub fn polygon(&self) -> &GeoPolygon {
        &self.polygon
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        self.polygon.vertices()
    }

    pub fn area_m2(&self) -> f64 {
        self.area_m2
    }

    pub fn perimeter_m(&self) -> f64 {
        self.perimeter_m
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn closed_at(&self) -> Option<Timestamp> {
        self.closed_at
    }

    pub fn confirmed_at(&self) -> Timestamp {
        self.confirmed_at
    }
}
