//! Per-fix anti-cheat filtering: accuracy, speed and jitter

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::config::ClaimConfig;
use crate::core::types::{GeoPoint, Timestamp};

/// Outcome of filtering one fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleVerdict {
    Accepted,
    /// Too close to the last accepted sample to add information
    Jitter,
    /// Weak signal, or coordinates that are not a place on earth
    RejectedAccuracy,
    /// Implausible speed, or a clock anomaly (missing or non-increasing time)
    RejectedSpeed,
}

impl SampleVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SampleVerdict::Accepted)
    }

    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SampleVerdict::RejectedAccuracy | SampleVerdict::RejectedSpeed
        )
    }
}

/// A fix together with what the filter derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSample {
    pub point: GeoPoint,
    /// Implied speed from the last accepted sample, when computable
    pub speed_mps: Option<f64>,
    pub verdict: SampleVerdict,
    /// Arrival order within the session, counting every fix
    pub sequence: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Speed,
    Accuracy,
}

/// Transient warning for the presentation layer.
///
/// The engine only describes the warning; showing and clearing it after
/// `display_for` is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleWarning {
    pub kind: WarningKind,
    pub implied_speed_mps: Option<f64>,
    pub accuracy_m: Option<f64>,
    pub display_for: Duration,
}

impl SampleWarning {
    pub fn message(&self) -> &'static str {
        match self.kind {
            WarningKind::Speed => "Moving too fast. Slow down to keep claiming.",
            WarningKind::Accuracy => "GPS signal is weak. Move to open sky.",
        }
    }
}

/// Stateful filter holding the last accepted fix of a session
#[derive(Debug, Clone)]
pub struct SampleFilter {
    max_speed_mps: f64,
    max_accuracy_m: f64,
    min_spacing_m: f64,
    warning_duration: Duration,
    last_accepted: Option<GeoPoint>,
    /// Reference time when the last accepted fix carries none
    started_at: Option<Timestamp>,
}

impl SampleFilter {
    pub fn new(config: &ClaimConfig) -> Self {
        Self {
            max_speed_mps: config.max_speed_mps,
            max_accuracy_m: config.max_horizontal_accuracy_m,
            min_spacing_m: config.min_sample_spacing_m,
            warning_duration: config.warning_duration(),
            last_accepted: None,
            started_at: None,
        }
    }

    pub fn last_accepted(&self) -> Option<&GeoPoint> {
        self.last_accepted.as_ref()
    }

    /// Forget the last accepted fix (new session)
    pub fn reset(&mut self) {
        self.last_accepted = None;
        self.started_at = None;
    }

    /// Forget the last accepted fix and time untimestamped starts from `now`
    pub fn reset_at(&mut self, now: Timestamp) {
        self.last_accepted = None;
        self.started_at = Some(now);
    }

    /// Classify `fix` against `last` without touching filter state
    pub fn evaluate(&self, fix: &GeoPoint, last: Option<&GeoPoint>) -> (SampleVerdict, Option<f64>) {
        if !fix.has_valid_coordinates() {
            return (SampleVerdict::RejectedAccuracy, None);
        }
        if let Some(accuracy) = fix.horizontal_accuracy {
            if !(accuracy <= self.max_accuracy_m) {
                return (SampleVerdict::RejectedAccuracy, None);
            }
        }

        let Some(last) = last else {
            return (SampleVerdict::Accepted, None);
        };

        let distance = last.distance_to(fix);
        let speed = match (fix.timestamp, last.timestamp.or(self.started_at)) {
            (None, _) => return (SampleVerdict::RejectedSpeed, None),
            // No reference time at all: only the distance checks apply
            (Some(_), None) => None,
            (Some(now), Some(then)) => {
                let elapsed = now - then;
                if !(elapsed > 0.0 && elapsed.is_finite()) {
                    return (SampleVerdict::RejectedSpeed, None);
                }
                Some(distance / elapsed)
            }
        };

        if let Some(speed) = speed {
            if !(speed <= self.max_speed_mps) {
                return (SampleVerdict::RejectedSpeed, Some(speed));
            }
        }

        if distance < self.min_spacing_m {
            return (SampleVerdict::Jitter, speed);
        }

        (SampleVerdict::Accepted, speed)
    }

    /// Filter `fix`, updating the last accepted fix only on acceptance
    pub fn accept(&mut self, fix: GeoPoint, sequence: u64) -> (PathSample, Option<SampleWarning>) {
        let (verdict, speed_mps) = self.evaluate(&fix, self.last_accepted.as_ref());

        if verdict.is_accepted() {
            self.last_accepted = Some(fix);
        } else if verdict.is_rejection() {
            tracing::debug!(
                "Rejected fix #{} ({:?}): speed {:?} m/s, accuracy {:?} m",
                sequence,
                verdict,
                speed_mps,
                fix.horizontal_accuracy
            );
        }

        let sample = PathSample {
            point: fix,
            speed_mps,
            verdict,
            sequence,
        };
        let warning = self.warning_for(&sample);
        (sample, warning)
    }

    fn warning_for(&self, sample: &PathSample) -> Option<SampleWarning> {
        let kind = match sample.verdict {
            SampleVerdict::RejectedSpeed => WarningKind::Speed,
            SampleVerdict::RejectedAccuracy => WarningKind::Accuracy,
            SampleVerdict::Accepted | SampleVerdict::Jitter => return None,
        };
        Some(SampleWarning {
            kind,
            implied_speed_mps: sample.speed_mps,
            accuracy_m: sample.point.horizontal_accuracy,
            display_for: self.warning_duration,
        })
    }
}
