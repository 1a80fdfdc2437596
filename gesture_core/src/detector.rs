//! Gesture detector boundary.
//!
//! The detection engine itself is opaque. The coordinator drives its two
//! setters and reacts to the [`DetectorReport`]s it pushes back; it never
//! polls it.

use crate::types::TrackingId;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

/// Control surface of a gesture detection engine.
pub trait GestureDetector: Send {
    /// Body the detector is currently bound to.
    fn tracking_id(&self) -> TrackingId;

    /// Rebind the detector's frame source to another body. Expensive.
    fn set_tracking_id(&mut self, id: TrackingId);

    fn is_paused(&self) -> bool;

    /// Suspend or resume result delivery without releasing resources.
    fn set_paused(&mut self, paused: bool);

    /// Release the detector's resources. Consumes the detector.
    fn release(self: Box<Self>);
}

/// One result pushed by a detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorReport {
    /// Body the detector was bound to when it produced this result
    pub tracking_id: TrackingId,
    pub body_tracking_id_valid: bool,
    pub gesture_detected: bool,
    pub confidence: f32,
    pub gesture_name: String,
}

impl DetectorReport {
    /// The bound body is no longer tracked.
    pub fn lost(tracking_id: TrackingId) -> Self {
        Self {
            tracking_id,
            body_tracking_id_valid: false,
            gesture_detected: false,
            confidence: 0.0,
            gesture_name: String::new(),
        }
    }

    /// Body tracked, no gesture in progress.
    pub fn idle(tracking_id: TrackingId) -> Self {
        Self {
            body_tracking_id_valid: true,
            ..Self::lost(tracking_id)
        }
    }

    /// Body tracked and performing `gesture_name`.
    pub fn detected(tracking_id: TrackingId, confidence: f32, gesture_name: &str) -> Self {
        Self {
            tracking_id,
            body_tracking_id_valid: true,
            gesture_detected: true,
            confidence,
            gesture_name: gesture_name.to_owned(),
        }
    }
}

/// A control call received by a [`RecordingDetector`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorCall {
    SetTrackingId(TrackingId),
    SetPaused(bool),
    Release,
}

/// Detector stand-in that records every control call into a shared log.
///
/// Used where no engine is attached (log replay) and in tests.
#[derive(Debug)]
pub struct RecordingDetector {
    tracking_id: TrackingId,
    paused: bool,
    calls: Arc<Mutex<Vec<DetectorCall>>>,
}

impl RecordingDetector {
    /// A fresh, unbound, paused detector and a handle on its call log.
    pub fn new() -> (Self, Arc<Mutex<Vec<DetectorCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let detector = Self {
            tracking_id: TrackingId::NONE,
            paused: true,
            calls: calls.clone(),
        };
        (detector, calls)
    }

    fn record(&self, call: DetectorCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl GestureDetector for RecordingDetector {
    fn tracking_id(&self) -> TrackingId {
        self.tracking_id
    }

    fn set_tracking_id(&mut self, id: TrackingId) {
        self.tracking_id = id;
        self.record(DetectorCall::SetTrackingId(id));
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.record(DetectorCall::SetPaused(paused));
    }

    fn release(self: Box<Self>) {
        self.record(DetectorCall::Release);
    }
}
