//! Session statistics: frame churn, detector rebinding and result traffic.

use serde::{Deserialize, Serialize};

/// Running counters for one coordination session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Body frames processed
    pub frames: u64,
    /// Ticks where no frame was ready
    pub empty_ticks: u64,
    /// Frames dropped because the coordinator queue was full
    pub frames_dropped: u64,
    /// Changes of the active slot (including to / from no body)
    pub active_switches: u64,
    /// Detector rebinds to a different tracking id
    pub rebinds: u64,
    /// Detector reports applied to the result
    pub reports_applied: u64,
    /// Detector reports discarded because they belong to another binding
    pub reports_stale: u64,
    /// Transitions of the result from tracked to Untracked
    pub untracked_collapses: u64,
    /// Sensor availability transitions
    pub status_changes: u64,
    /// Result field notifications emitted
    pub notifications: u64,
}

impl SessionStats {
    /// Fraction of detector reports that were discarded as stale.
    pub fn stale_ratio(&self) -> f64 {
        let total = self.reports_applied + self.reports_stale;
        if total == 0 {
            0.0
        } else {
            self.reports_stale as f64 / total as f64
        }
    }

    /// Frames per detector rebind; `None` before the first rebind.
    pub fn frames_per_rebind(&self) -> Option<f64> {
        (self.rebinds > 0).then(|| self.frames as f64 / self.rebinds as f64)
    }
}
