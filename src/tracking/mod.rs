//! Live GPS path tracking: anti-cheat filtering and loop closure

mod filter;
mod path;

pub use filter::{PathSample, SampleFilter, SampleVerdict, SampleWarning, WarningKind};
pub use path::{
    CandidatePolygon, IngestOutcome, PathTracker, SampleStats, TrackingSession, TrackingState,
};
