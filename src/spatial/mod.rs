//! Geographic geometry: pure primitives and the polygon ring type

pub mod geo_math;
mod polygon;

pub use geo_math::{AreaMethod, LocalFrame, EARTH_RADIUS_M};
pub use polygon::{GeoBounds, GeoPolygon, MIN_POLYGON_VERTICES};
