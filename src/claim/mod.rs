//! Claim flow orchestration

mod session;
mod territory;

pub use session::{SubmitOutcome, TerritoryClaimSession};
pub use territory::ConfirmedTerritory;
