//! Raw body records exactly as the sensor reports them, one per body slot.

use serde::{Deserialize, Serialize};

/// Hand pose reported by the sensor for a single hand.
///
/// Only `NotTracked` means "no hand data"; `Unknown` is a tracked hand whose
/// pose could not be classified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandState {
    Unknown,
    #[default]
    NotTracked,
    Open,
    Closed,
    Lasso,
}

impl HandState {
    /// True when the sensor has hand data for this hand.
    pub fn is_tracked(self) -> bool {
        self != HandState::NotTracked
    }
}

/// One body slot of a sensor frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBody {
    /// Sensor-assigned identifier, persistent while the body stays visible.
    /// `0` means the slot holds no body.
    pub tracking_id: u64,
    pub is_tracked: bool,
    pub hand_left_state: HandState,
    pub hand_right_state: HandState,
    /// Spine-base position in camera space (meters)
    pub position: [f64; 3],
}

impl RawBody {
    /// An unoccupied slot.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_tracked_lacks_hand_data() {
        assert!(!HandState::NotTracked.is_tracked());
        for state in [
            HandState::Unknown,
            HandState::Open,
            HandState::Closed,
            HandState::Lasso,
        ] {
            assert!(state.is_tracked(), "{state:?} should carry hand data");
        }
    }

    #[test]
    fn empty_slot_is_unbound() {
        let body = RawBody::empty();
        assert_eq!(body.tracking_id, 0);
        assert!(!body.is_tracked);
        assert_eq!(body.hand_left_state, HandState::NotTracked);
        assert_eq!(body.hand_right_state, HandState::NotTracked);
    }
}
