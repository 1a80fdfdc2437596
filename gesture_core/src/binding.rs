//! Detector binding: which body the gesture detector follows, and whether it
//! is paused.
//!
//! # Policy
//! - **Rebind** only when the active body's tracking id differs from the
//!   bound one. Rebinding is the expensive operation and never happens on
//!   every tick.
//! - **Pause** whenever the bound id is the unbound sentinel, and force the
//!   result to Untracked right away instead of waiting for the detector.
//! - **Resume** whenever a real body is bound.
//!
//! Pausing is a cheap suspend signal; it never releases detector resources.

use crate::{
    detector::GestureDetector,
    result::{ResultStateStore, UNTRACKED_CONFIDENCE},
    types::{BodyRecord, TrackingId},
};
use tracing::debug;

/// What one [`TrackingBinding::bind`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BindOutcome {
    pub bound: TrackingId,
    pub paused: bool,
    /// The detector was rebound to a different body
    pub rebound: bool,
    /// Result notifications emitted by the forced Untracked update
    pub notifications: usize,
}

/// Mirror of the detector's binding, owned by the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackingBinding {
    bound_tracking_id: TrackingId,
    paused: bool,
}

impl Default for TrackingBinding {
    fn default() -> Self {
        Self {
            bound_tracking_id: TrackingId::NONE,
            paused: true,
        }
    }
}

impl TrackingBinding {
    /// Start from whatever the detector currently reports.
    pub fn mirror(detector: &dyn GestureDetector) -> Self {
        Self {
            bound_tracking_id: detector.tracking_id(),
            paused: detector.is_paused(),
        }
    }

    pub fn bound_tracking_id(&self) -> TrackingId {
        self.bound_tracking_id
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Bind the detector to `active` (or to nobody) and update pause state.
    pub fn bind(
        &mut self,
        active: Option<&BodyRecord>,
        detector: &mut dyn GestureDetector,
        results: &mut ResultStateStore,
    ) -> BindOutcome {
        let id = active.map_or(TrackingId::NONE, |body| body.tracking_id);

        let rebound = id != self.bound_tracking_id;
        if rebound {
            debug!(from = %self.bound_tracking_id, to = %id, "rebinding gesture detector");
            self.bound_tracking_id = id;
            detector.set_tracking_id(id);
        }

        let mut notifications = 0;
        let paused = !self.bound_tracking_id.is_bound();
        if paused {
            notifications = results.update(false, false, UNTRACKED_CONFIDENCE, "");
        }
        if paused != self.paused {
            self.paused = paused;
            detector.set_paused(paused);
        }

        BindOutcome {
            bound: self.bound_tracking_id,
            paused: self.paused,
            rebound,
            notifications,
        }
    }

    /// Whether a report produced for `id` belongs to the current binding.
    pub fn accepts(&self, id: TrackingId) -> bool {
        !self.paused && id == self.bound_tracking_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        detector::{DetectorCall, RecordingDetector},
        result::GestureResult,
        types::HandState,
    };

    fn body(id: u64) -> BodyRecord {
        BodyRecord::tracked(id, HandState::Open, HandState::NotTracked)
    }

    #[test]
    fn first_body_rebinds_and_resumes() {
        let (mut detector, calls) = RecordingDetector::new();
        let mut binding = TrackingBinding::mirror(&detector);
        let mut results = ResultStateStore::new();

        let out = binding.bind(Some(&body(5)), &mut detector, &mut results);
        assert_eq!(
            out,
            BindOutcome {
                bound: TrackingId(5),
                paused: false,
                rebound: true,
                notifications: 0,
            }
        );
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                DetectorCall::SetTrackingId(TrackingId(5)),
                DetectorCall::SetPaused(false),
            ]
        );
    }

    #[test]
    fn same_body_never_rebinds() {
        let (mut detector, calls) = RecordingDetector::new();
        let mut binding = TrackingBinding::mirror(&detector);
        let mut results = ResultStateStore::new();

        binding.bind(Some(&body(5)), &mut detector, &mut results);
        for _ in 0..100 {
            let out = binding.bind(Some(&body(5)), &mut detector, &mut results);
            assert!(!out.rebound);
        }
        let rebinds = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, DetectorCall::SetTrackingId(_)))
            .count();
        assert_eq!(rebinds, 1);
    }

    #[test]
    fn losing_the_body_pauses_and_forces_untracked() {
        let (mut detector, _calls) = RecordingDetector::new();
        let mut binding = TrackingBinding::mirror(&detector);
        let mut results = ResultStateStore::new();

        binding.bind(Some(&body(5)), &mut detector, &mut results);
        results.update(true, true, 0.8, "Swipe");

        let out = binding.bind(None, &mut detector, &mut results);
        assert!(out.rebound && out.paused);
        assert_eq!(out.bound, TrackingId::NONE);
        assert!(out.notifications > 0);
        assert!(detector.is_paused());
        assert_eq!(results.snapshot(), GestureResult::untracked());
    }

    #[test]
    fn slot_with_zero_id_counts_as_no_body() {
        let (mut detector, _calls) = RecordingDetector::new();
        let mut binding = TrackingBinding::mirror(&detector);
        let mut results = ResultStateStore::new();
        binding.bind(Some(&body(5)), &mut detector, &mut results);

        let out = binding.bind(Some(&BodyRecord::EMPTY), &mut detector, &mut results);
        assert!(out.paused);
        assert_eq!(detector.tracking_id(), TrackingId::NONE);
    }

    #[test]
    fn switching_bodies_keeps_detector_running() {
        let (mut detector, calls) = RecordingDetector::new();
        let mut binding = TrackingBinding::mirror(&detector);
        let mut results = ResultStateStore::new();

        binding.bind(Some(&body(5)), &mut detector, &mut results);
        calls.lock().unwrap().clear();
        let out = binding.bind(Some(&body(8)), &mut detector, &mut results);
        assert!(out.rebound && !out.paused);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![DetectorCall::SetTrackingId(TrackingId(8))]
        );
    }

    #[test]
    fn accepts_only_reports_for_the_bound_body() {
        let (mut detector, _calls) = RecordingDetector::new();
        let mut binding = TrackingBinding::mirror(&detector);
        let mut results = ResultStateStore::new();
        assert!(!binding.accepts(TrackingId::NONE));

        binding.bind(Some(&body(5)), &mut detector, &mut results);
        assert!(binding.accepts(TrackingId(5)));
        assert!(!binding.accepts(TrackingId(4)));
    }
}
