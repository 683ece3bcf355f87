//! Path tracking state machine and loop-closure detection
//!
//! States run `Idle -> Tracking -> Closed -> (Validated | Failed) -> Idle`.
//! A failed closure may also resume tracking, keeping the walked path.

use serde::{Deserialize, Serialize};

use super::filter::{PathSample, SampleFilter, SampleVerdict, SampleWarning};
use crate::core::config::ClaimConfig;
use crate::core::error::{ClaimError, Result};
use crate::core::types::{now_timestamp, GeoPoint, Timestamp};
use crate::spatial::GeoPolygon;

/// Lifecycle of one claim attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingState {
    #[default]
    Idle,
    Tracking,
    Closed,
    Validated,
    Failed,
}

/// Per-session counters for the UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub accepted: u32,
    pub jitter: u32,
    pub rejected_accuracy: u32,
    pub rejected_speed: u32,
}

impl SampleStats {
    fn record(&mut self, verdict: SampleVerdict) {
        match verdict {
            SampleVerdict::Accepted => self.accepted += 1,
            SampleVerdict::Jitter => self.jitter += 1,
            SampleVerdict::RejectedAccuracy => self.rejected_accuracy += 1,
            SampleVerdict::RejectedSpeed => self.rejected_speed += 1,
        }
    }

    pub fn rejected(&self) -> u32 {
        self.rejected_accuracy + self.rejected_speed
    }
}

/// A closed path frozen at the moment of closure, awaiting validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePolygon {
    polygon: GeoPolygon,
    started_at: Option<Timestamp>,
    closed_at: Option<Timestamp>,
    closing_sequence: u64,
    path_length_m: f64,
}

impl CandidatePolygon {
    pub fn polygon(&self) -> &GeoPolygon {
        &self.polygon
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        self.polygon.vertices()
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    /// Timestamp of the fix that closed the loop
    pub fn closed_at(&self) -> Option<Timestamp> {
        self.closed_at
    }

    pub fn closing_sequence(&self) -> u64 {
        self.closing_sequence
    }

    pub fn path_length_m(&self) -> f64 {
        self.path_length_m
    }

    pub fn into_polygon(self) -> GeoPolygon {
        self.polygon
    }
}

/// Mutable aggregate owned by one claim attempt
#[derive(Debug, Clone, Default)]
pub struct TrackingSession {
    state: TrackingState,
    samples: Vec<PathSample>,
    started_at: Option<Timestamp>,
    next_sequence: u64,
    path_length_m: f64,
    closure_armed: bool,
    stats: SampleStats,
    candidate: Option<CandidatePolygon>,
}

impl TrackingSession {
    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// Accepted samples in arrival order
    pub fn samples(&self) -> &[PathSample] {
        &self.samples
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    /// Accumulated length of the accepted path in metres
    pub fn path_length_m(&self) -> f64 {
        self.path_length_m
    }

    pub fn stats(&self) -> SampleStats {
        self.stats
    }

    /// Whether the player has left the start zone since tracking (re)started
    pub fn closure_armed(&self) -> bool {
        self.closure_armed
    }

    /// Distance from the newest accepted sample back to the first one
    pub fn distance_to_start(&self) -> Option<f64> {
        let first = self.samples.first()?;
        let newest = self.samples.last()?;
        Some(newest.point.distance_to(&first.point))
    }

    pub fn candidate(&self) -> Option<&CandidatePolygon> {
        self.candidate.as_ref()
    }
}

/// Result of feeding one fix to the tracker
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub sample: PathSample,
    pub warning: Option<SampleWarning>,
    /// True when this fix closed the loop
    pub closed: bool,
}

/// Owns the in-progress path and detects when it closes
#[derive(Debug, Clone)]
pub struct PathTracker {
    filter: SampleFilter,
    session: TrackingSession,
    closure_distance_m: f64,
    min_path_length_m: f64,
    min_closure_samples: usize,
}

impl PathTracker {
    pub fn new(config: &ClaimConfig) -> Self {
        Self {
            filter: SampleFilter::new(config),
            session: TrackingSession::default(),
            closure_distance_m: config.closure_distance_m,
            min_path_length_m: config.min_path_length_m,
            min_closure_samples: config.min_closure_samples,
        }
    }

    pub fn state(&self) -> TrackingState {
        self.session.state
    }

    pub fn session(&self) -> &TrackingSession {
        &self.session
    }

    pub fn candidate(&self) -> Option<&CandidatePolygon> {
        self.session.candidate.as_ref()
    }

    /// Start tracking now
    pub fn start(&mut self) -> Result<()> {
        self.start_at(now_timestamp())
    }

    /// Start tracking with an explicit start time
    pub fn start_at(&mut self, now: Timestamp) -> Result<()> {
        self.require_state("start", &[TrackingState::Idle])?;

        self.filter.reset_at(now);
        self.session = TrackingSession {
            state: TrackingState::Tracking,
            started_at: Some(now),
            ..TrackingSession::default()
        };
        tracing::info!("Tracking started at {:.3}", now);
        Ok(())
    }

    /// Feed one raw fix. Only valid while tracking.
    pub fn ingest(&mut self, fix: GeoPoint) -> Result<IngestOutcome> {
        self.require_state("ingest", &[TrackingState::Tracking])?;

        let sequence = self.session.next_sequence;
        self.session.next_sequence += 1;

        let (sample, warning) = self.filter.accept(fix, sequence);
        self.session.stats.record(sample.verdict);

        let mut closed = false;
        if sample.verdict.is_accepted() {
            if let Some(previous) = self.session.samples.last() {
                self.session.path_length_m += previous.point.distance_to(&sample.point);
            }
            self.session.samples.push(sample);
            closed = self.check_closure();
        }

        Ok(IngestOutcome {
            sample,
            warning,
            closed,
        })
    }

    fn check_closure(&mut self) -> bool {
        let Some(to_start) = self.session.distance_to_start() else {
            return false;
        };

        if !self.session.closure_armed {
            if to_start > self.closure_distance_m {
                self.session.closure_armed = true;
                tracing::debug!("Left start zone ({:.1} m), closure armed", to_start);
            }
            return false;
        }

        if self.session.samples.len() < self.min_closure_samples
            || self.session.path_length_m < self.min_path_length_m
            || to_start >= self.closure_distance_m
        {
            return false;
        }

        let vertices: Vec<GeoPoint> = self.session.samples.iter().map(|s| s.point).collect();
        let polygon = match GeoPolygon::new(vertices) {
            Ok(polygon) => polygon,
            Err(e) => {
                tracing::warn!("Closure detected but path is degenerate: {}", e);
                return false;
            }
        };

        let closing = self.session.samples.last().copied();
        self.session.candidate = Some(CandidatePolygon {
            polygon,
            started_at: self.session.started_at,
            closed_at: closing.and_then(|s| s.point.timestamp),
            closing_sequence: closing.map_or(0, |s| s.sequence),
            path_length_m: self.session.path_length_m,
        });
        self.session.state = TrackingState::Closed;

        tracing::info!(
            "Loop closed after {} samples, {:.1} m walked, {:.1} m from start",
            self.session.samples.len(),
            self.session.path_length_m,
            to_start
        );
        true
    }

    /// Record the validator's verdict on the frozen candidate
    pub fn record_validation(&mut self, passed: bool) -> Result<()> {
        self.require_state("record_validation", &[TrackingState::Closed])?;
        self.session.state = if passed {
            TrackingState::Validated
        } else {
            TrackingState::Failed
        };
        Ok(())
    }

    /// Go back to tracking after a failed closure, keeping the walked path
    pub fn resume(&mut self) -> Result<()> {
        self.require_state("resume", &[TrackingState::Failed])?;
        self.session.candidate = None;
        self.session.closure_armed = false;
        self.session.state = TrackingState::Tracking;
        tracing::info!(
            "Tracking resumed with {} samples",
            self.session.samples.len()
        );
        Ok(())
    }

    /// Hand out the validated candidate and return to idle
    pub fn finish(&mut self) -> Result<CandidatePolygon> {
        self.require_state("finish", &[TrackingState::Validated])?;
        let session = std::mem::take(&mut self.session);
        self.filter.reset();
        session.candidate.ok_or(ClaimError::InvalidState {
            operation: "finish",
            state: TrackingState::Validated,
        })
    }

    /// Discard everything and return to idle. Always safe.
    pub fn cancel(&mut self) {
        if self.session.state != TrackingState::Idle {
            tracing::info!("Tracking cancelled in state {:?}", self.session.state);
        }
        self.session = TrackingSession::default();
        self.filter.reset();
    }

    fn require_state(&self, operation: &'static str, allowed: &[TrackingState]) -> Result<()> {
        if allowed.contains(&self.session.state) {
            Ok(())
        } else {
            tracing::warn!(
                "`{}` called in state {:?}",
                operation,
                self.session.state
            );
            Err(ClaimError::InvalidState {
                operation,
                state: self.session.state,
            })
        }
    }
}
