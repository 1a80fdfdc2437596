//! Coordinator: the single owner of active-body selection, detector binding
//! and the gesture result.
//!
//! # Processing per body frame
//! 1. Select the active slot (stability, then first eligible slot)
//! 2. Bind the detector to the active body's tracking id (rebind on change)
//! 3. Pause + force Untracked when nobody is bound, resume otherwise
//!
//! # Processing per detector report (independent of frames)
//! 1. Discard reports tagged with a tracking id other than the bound one, or
//!    arriving while the detector is paused
//! 2. Apply the rest to the result store
//!
//! # Sensor availability
//! Losing the sensor clears the active slot and unbinds the detector, which
//! collapses the result to Untracked in the same call. Frames arriving after
//! the sensor returns rebuild the binding without any restart.

use crate::{
    binding::{BindOutcome, TrackingBinding},
    detector::{DetectorReport, GestureDetector},
    metrics::SessionStats,
    result::{GestureResult, ResultStateStore},
    selector::select_active,
    types::{ActiveIndex, BodyFrame, BodyRecord, TrackingId},
};
use sensor_models::SensorStatus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for the coordinator.
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Drop detector reports that do not belong to the current binding.
    /// When false every report is applied as it arrives.
    pub discard_stale_reports: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            discard_stale_reports: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Events and outputs
// ---------------------------------------------------------------------------

/// Everything that can mutate coordinator state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CoordinatorEvent {
    /// A body frame arrived
    Frame(BodyFrame),
    /// Frame callback fired but no frame was ready
    NoFrame,
    /// The detector pushed a result
    Report(DetectorReport),
    /// The sensor's availability changed
    Availability(SensorStatus),
}

/// Outcome of one processed body frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutput {
    pub active: ActiveIndex,
    /// The active slot differs from the previous frame's
    pub switched: bool,
    pub binding: BindOutcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    Applied { notifications: usize },
    Stale,
}

/// Point-in-time view of the coordinator for callers outside its thread.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinatorSnapshot {
    pub active: ActiveIndex,
    pub bound: TrackingId,
    pub paused: bool,
    pub status: SensorStatus,
    pub result: GestureResult,
    pub stats: SessionStats,
}

type StatusSubscriber = Box<dyn FnMut(SensorStatus) + Send>;

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

pub struct Coordinator {
    pub config: CoordinatorConfig,
    active: ActiveIndex,
    binding: TrackingBinding,
    detector: Box<dyn GestureDetector>,
    results: ResultStateStore,
    status: SensorStatus,
    status_subscribers: Vec<StatusSubscriber>,
    stats: SessionStats,
}

impl Coordinator {
    /// Take ownership of `detector`; the binding starts as a mirror of it.
    pub fn new(config: CoordinatorConfig, detector: Box<dyn GestureDetector>) -> Self {
        let binding = TrackingBinding::mirror(detector.as_ref());
        Self {
            config,
            active: None,
            binding,
            detector,
            results: ResultStateStore::new(),
            status: SensorStatus::Running,
            status_subscribers: Vec::new(),
            stats: SessionStats::default(),
        }
    }

    pub fn active(&self) -> ActiveIndex {
        self.active
    }

    pub fn binding(&self) -> &TrackingBinding {
        &self.binding
    }

    pub fn results(&self) -> &ResultStateStore {
        &self.results
    }

    /// Mutable access for registering result subscribers.
    pub fn results_mut(&mut self) -> &mut ResultStateStore {
        &mut self.results
    }

    pub fn status(&self) -> SensorStatus {
        self.status
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Register a callback for sensor availability changes.
    pub fn subscribe_status<F>(&mut self, callback: F)
    where
        F: FnMut(SensorStatus) + Send + 'static,
    {
        self.status_subscribers.push(Box::new(callback));
    }

    pub fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            active: self.active,
            bound: self.binding.bound_tracking_id(),
            paused: self.binding.is_paused(),
            status: self.status,
            result: self.results.snapshot(),
            stats: self.stats.clone(),
        }
    }

    /// Dispatch one event to its handler.
    pub fn handle(&mut self, event: &CoordinatorEvent) {
        match event {
            CoordinatorEvent::Frame(frame) => {
                self.on_frame(Some(frame));
            }
            CoordinatorEvent::NoFrame => {
                self.on_frame(None);
            }
            CoordinatorEvent::Report(report) => {
                self.on_report(report);
            }
            CoordinatorEvent::Availability(status) => {
                self.on_availability(*status);
            }
        }
    }

    /// Process one frame-arrival tick. `None` (no frame ready) is a no-op.
    pub fn on_frame(&mut self, frame: Option<&BodyFrame>) -> Option<TickOutput> {
        let Some(frame) = frame else {
            self.stats.empty_ticks += 1;
            return None;
        };
        self.stats.frames += 1;

        // ----------------------------------------------------------------
        // Step 1: Select the active slot
        // ----------------------------------------------------------------
        let next = select_active(frame, self.active);
        let switched = next != self.active;
        if switched {
            debug!(from = ?self.active, to = ?next, "active body changed");
            self.stats.active_switches += 1;
        }
        self.active = next;

        // ----------------------------------------------------------------
        // Step 2-3: Bind, pause / resume
        // ----------------------------------------------------------------
        let active_body = next.and_then(|index| frame.get(index));
        let binding = self.rebind(active_body);

        Some(TickOutput {
            active: next,
            switched,
            binding,
        })
    }

    /// Apply a detector report unless it belongs to another binding.
    pub fn on_report(&mut self, report: &DetectorReport) -> ReportOutcome {
        if self.config.discard_stale_reports && !self.binding.accepts(report.tracking_id) {
            debug!(
                report = %report.tracking_id,
                bound = %self.binding.bound_tracking_id(),
                paused = self.binding.is_paused(),
                "discarding stale detector report"
            );
            self.stats.reports_stale += 1;
            return ReportOutcome::Stale;
        }

        let was_tracked = self.results.is_tracked();
        let notifications = self.results.update(
            report.body_tracking_id_valid,
            report.gesture_detected,
            report.confidence,
            &report.gesture_name,
        );
        self.stats.reports_applied += 1;
        self.record_notifications(was_tracked, notifications);
        ReportOutcome::Applied { notifications }
    }

    /// Track sensor availability. Returns true if the status changed.
    pub fn on_availability(&mut self, status: SensorStatus) -> bool {
        if status == self.status {
            return false;
        }
        let previous = std::mem::replace(&mut self.status, status);
        self.stats.status_changes += 1;

        if status.is_available() {
            info!(from = ?previous, "sensor available");
        } else {
            warn!(status = status.label(), "sensor unavailable, dropping active body");
            if self.active.take().is_some() {
                self.stats.active_switches += 1;
            }
            self.rebind(None);
        }

        for subscriber in &mut self.status_subscribers {
            subscriber(status);
        }
        true
    }

    /// Release the detector and return the final statistics.
    pub fn shutdown(self) -> SessionStats {
        info!(
            frames = self.stats.frames,
            rebinds = self.stats.rebinds,
            "releasing gesture detector"
        );
        self.detector.release();
        self.stats
    }

    fn rebind(&mut self, active: Option<&BodyRecord>) -> BindOutcome {
        let was_tracked = self.results.is_tracked();
        let outcome = self
            .binding
            .bind(active, self.detector.as_mut(), &mut self.results);
        if outcome.rebound {
            self.stats.rebinds += 1;
        }
        self.record_notifications(was_tracked, outcome.notifications);
        outcome
    }

    fn record_notifications(&mut self, was_tracked: bool, notifications: usize) {
        self.stats.notifications += notifications as u64;
        if was_tracked && !self.results.is_tracked() {
            self.stats.untracked_collapses += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
