use thiserror::Error;

use crate::tracking::TrackingState;

/// Contract and environment errors.
///
/// Player-facing outcomes (rejected fixes, failed validation) are values,
/// not errors; see `SampleVerdict` and `ValidationResult`.
#[derive(Error, Debug)]
pub enum ClaimError {
    #[error("Operation `{operation}` is not allowed in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: TrackingState,
    },

    #[error("Polygon needs at least {minimum} vertices, got {count}")]
    DegeneratePolygon { count: usize, minimum: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClaimError>;
