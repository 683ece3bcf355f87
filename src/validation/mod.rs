//! Validation of closed paths and of building sites

mod placement;
mod polygon;

pub use placement::{PlacementValidator, PlacementVerdict};
pub use polygon::{FailureReason, PolygonValidator, ValidationResult};
