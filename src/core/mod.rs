pub mod config;
pub mod error;
pub mod types;

pub use config::ClaimConfig;
pub use error::{ClaimError, Result};
pub use types::{now_timestamp, GeoPoint, TerritoryId, Timestamp};
