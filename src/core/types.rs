//! Core type definitions used throughout the engine

use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::spatial::LocalFrame;

/// Seconds since the Unix epoch, as reported by the location source
pub type Timestamp = f64;

/// Current wall-clock time as a [`Timestamp`]
pub fn now_timestamp() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Unique identifier for confirmed territories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerritoryId(pub Uuid);

impl TerritoryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TerritoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single location fix in degrees.
///
/// Accuracy and timestamp are optional because not every source reports them.
/// Points are plain values; the engine never mutates a recorded fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            horizontal_accuracy: None,
            timestamp: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.horizontal_accuracy = Some(accuracy_m);
        self
    }

    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Great-circle distance in metres
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        self.to_geo().haversine_distance(&other.to_geo())
    }

    /// Point displaced by the given east/north offsets in metres.
    ///
    /// Accuracy and timestamp are carried over unchanged.
    pub fn offset_meters(&self, east_m: f64, north_m: f64) -> GeoPoint {
        let moved = LocalFrame::new(self).unproject(east_m, north_m);
        GeoPoint {
            latitude: moved.latitude,
            longitude: moved.longitude,
            ..*self
        }
    }

    /// Finite latitude in [-90, 90] and longitude in [-180, 180]
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && self.longitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// True when both points share latitude and longitude exactly
    pub fn same_position(&self, other: &GeoPoint) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }

    /// Convert to a `geo` point (x = longitude, y = latitude)
    pub fn to_geo(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_territory_id_unique() {
        let a = TerritoryId::new();
        let b = TerritoryId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_offset_meters_distance() {
        let origin = GeoPoint::new(37.7749, -122.4194);
        let east = origin.offset_meters(100.0, 0.0);
        let north = origin.offset_meters(0.0, 100.0);

        assert!((origin.distance_to(&east) - 100.0).abs() < 0.05);
        assert!((origin.distance_to(&north) - 100.0).abs() < 0.05);
        assert!(east.latitude == origin.latitude);
    }

    #[test]
    fn test_offset_keeps_metadata() {
        let p = GeoPoint::new(10.0, 20.0).with_accuracy(5.0).at(1_000.0);
        let q = p.offset_meters(3.0, 4.0);
        assert_eq!(q.horizontal_accuracy, Some(5.0));
        assert_eq!(q.timestamp, Some(1_000.0));
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(GeoPoint::new(90.0, -180.0).has_valid_coordinates());
        assert!(!GeoPoint::new(f64::NAN, 2.0).has_valid_coordinates());
        assert!(!GeoPoint::new(1.0, f64::INFINITY).has_valid_coordinates());
        assert!(!GeoPoint::new(91.0, 0.0).has_valid_coordinates());
        assert!(!GeoPoint::new(0.0, 180.5).has_valid_coordinates());
    }

    #[test]
    fn test_deserialize_minimal_fix() {
        let p: GeoPoint = serde_json::from_str(r#"{"latitude": 1.5, "longitude": 2.5}"#).unwrap();
        assert_eq!(p, GeoPoint::new(1.5, 2.5));
    }
}
