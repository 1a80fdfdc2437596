//! Active body selection.
//!
//! # Policy
//! 1. **Stability**: keep the previous active slot while its body is still
//!    tracked, so the detector is not rebound while that body stays visible.
//! 2. **First match**: otherwise take the lowest slot whose body is tracked
//!    and reports data for at least one hand (the detector needs hand data).
//! 3. No qualifying slot: no active body.
//!
//! There is no scoring and no hysteresis beyond rule 1. Slot 0 is as valid a
//! result of rule 2 as any other slot.

use crate::types::{ActiveIndex, BodyFrame, BodyRecord};

/// Choose the active slot of `frame` given the previously active slot.
pub fn select_active(frame: &BodyFrame, previous: ActiveIndex) -> ActiveIndex {
    if let Some(index) = previous {
        if frame.get(index).is_some_and(|body| body.is_tracked) {
            return Some(index);
        }
    }
    first_eligible(frame)
}

/// Lowest slot holding an eligible body.
pub fn first_eligible(frame: &BodyFrame) -> ActiveIndex {
    frame.iter().position(BodyRecord::is_eligible)
}
