//! Territory Claim - GPS loop claiming and geofence validation

pub mod claim;
pub mod core;
pub mod spatial;
pub mod tracking;
pub mod validation;
