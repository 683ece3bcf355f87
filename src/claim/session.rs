//! One claim attempt from "start tracking" to "ready to submit"
//!
//! The session is a plain value owned by whichever controller drives the
//! claim flow. All mutation goes through `&mut self`, so fixes are processed
//! one at a time; wrap it in a mutex or confine it to one task when fixes
//! arrive from another thread.

use crate::claim::territory::ConfirmedTerritory;
use crate::core::config::ClaimConfig;
use crate::core::error::{ClaimError, Result};
use crate::core::types::{now_timestamp, GeoPoint, Timestamp};
use crate::tracking::{
    CandidatePolygon, PathSample, PathTracker, SampleWarning, TrackingSession, TrackingState,
};
use crate::validation::{PolygonValidator, ValidationResult};

/// What the presentation layer gets back for each submitted fix
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub sample: PathSample,
    /// Transient warning to show, if the fix was rejected
    pub warning: Option<SampleWarning>,
    /// Set when this fix closed the loop and the candidate was validated
    pub validation: Option<ValidationResult>,
}

/// Orchestrates tracking and validation for a single claim attempt
#[derive(Debug, Clone)]
pub struct TerritoryClaimSession {
    tracker: PathTracker,
    validator: PolygonValidator,
    last_validation: Option<ValidationResult>,
}

impl TerritoryClaimSession {
    pub fn new(config: &ClaimConfig) -> Self {
        Self {
            tracker: PathTracker::new(config),
            validator: PolygonValidator::new(config),
            last_validation: None,
        }
    }

    pub fn state(&self) -> TrackingState {
        self.tracker.state()
    }

    /// Current partial path, statistics and candidate
    pub fn tracking(&self) -> &TrackingSession {
        self.tracker.session()
    }

    pub fn candidate(&self) -> Option<&CandidatePolygon> {
        self.tracker.candidate()
    }

    /// Result of the most recent closure attempt
    pub fn last_validation(&self) -> Option<&ValidationResult> {
        self.last_validation.as_ref()
    }

    pub fn begin_claim(&mut self) -> Result<()> {
        self.begin_claim_at(now_timestamp())
    }

    pub fn begin_claim_at(&mut self, now: Timestamp) -> Result<()> {
        self.tracker.start_at(now)?;
        self.last_validation = None;
        Ok(())
    }

    /// Feed one fix; validates immediately if it closes the loop
    pub fn submit_sample(&mut self, fix: GeoPoint) -> Result<SubmitOutcome> {
        let outcome = self.tracker.ingest(fix)?;

        let validation = if outcome.closed {
            Some(self.validate_candidate()?)
        } else {
            None
        };

        Ok(SubmitOutcome {
            sample: outcome.sample,
            warning: outcome.warning,
            validation,
        })
    }

    fn validate_candidate(&mut self) -> Result<ValidationResult> {
        let result = match self.tracker.candidate() {
            Some(candidate) => self.validator.validate(candidate),
            None => {
                return Err(ClaimError::InvalidState {
                    operation: "validate",
                    state: self.tracker.state(),
                })
            }
        };

        self.tracker.record_validation(result.is_passed())?;
        self.last_validation = Some(result);

        match result {
            ValidationResult::Passed { area_m2, perimeter_m } => tracing::info!(
                "Claim validated: {:.1} m², perimeter {:.1} m",
                area_m2,
                perimeter_m
            ),
            ValidationResult::Failed(reason) => {
                tracing::info!("Claim validation failed: {}", reason)
            }
        }
        Ok(result)
    }

    /// Continue walking after a failed closure
    pub fn resume_tracking(&mut self) -> Result<()> {
        self.tracker.resume()?;
        self.last_validation = None;
        Ok(())
    }

    pub fn confirm_and_extract(&mut self) -> Result<ConfirmedTerritory> {
        self.confirm_and_extract_at(now_timestamp())
    }

    /// Build the confirmed territory and reset to idle.
    ///
    /// Only legal in `Validated`; anything else is a usage error and leaves
    /// the session untouched.
    pub fn confirm_and_extract_at(&mut self, now: Timestamp) -> Result<ConfirmedTerritory> {
        let (area_m2, perimeter_m) = match (self.tracker.state(), self.last_validation) {
            (TrackingState::Validated, Some(ValidationResult::Passed { area_m2, perimeter_m })) => {
                (area_m2, perimeter_m)
            }
            (state, _) => {
                tracing::warn!("`confirm_and_extract` called in state {:?}", state);
                return Err(ClaimError::InvalidState {
                    operation: "confirm_and_extract",
                    state,
                });
            }
        };

        let candidate = self.tracker.finish()?;
        self.last_validation = None;

        let territory = ConfirmedTerritory::from_candidate(candidate, area_m2, perimeter_m, now);
        tracing::info!(
            "Territory {} confirmed: {} vertices, {:.1} m²",
            territory.id(),
            territory.vertices().len(),
            territory.area_m2()
        );
        Ok(territory)
    }

    /// Discard everything and return to idle. Always safe.
    pub fn cancel(&mut self) {
        self.tracker.cancel();
        self.last_validation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_while_idle_fails() {
        let mut session = TerritoryClaimSession::new(&ClaimConfig::default());
        let err = session.confirm_and_extract_at(0.0).unwrap_err();
        assert!(matches!(
            err,
            ClaimError::InvalidState { operation: "confirm_and_extract", state: TrackingState::Idle }
        ));
    }

    #[test]
    fn test_confirm_while_tracking_leaves_session_intact() {
        let mut session = TerritoryClaimSession::new(&ClaimConfig::default());
        session.begin_claim_at(0.0).unwrap();
        session
            .submit_sample(GeoPoint::new(1.0, 1.0).at(0.0))
            .unwrap();

        assert!(session.confirm_and_extract_at(5.0).is_err());
        assert_eq!(session.state(), TrackingState::Tracking);
        assert_eq!(session.tracking().samples().len(), 1);
    }

    #[test]
    fn test_submit_before_begin_fails() {
        let mut session = TerritoryClaimSession::new(&ClaimConfig::default());
        assert!(session.submit_sample(GeoPoint::new(1.0, 1.0).at(0.0)).is_err());
    }

    #[test]
    fn test_cancel_resets() {
        let mut session = TerritoryClaimSession::new(&ClaimConfig::default());
        session.begin_claim_at(0.0).unwrap();
        session.cancel();
        assert_eq!(session.state(), TrackingState::Idle);
        assert!(session.last_validation().is_none());
        assert!(session.begin_claim_at(1.0).is_ok());
    }
}
