//! Fundamental types used across the entire workspace.

use crate::ingest::IngestError;
use sensor_models::RawBody;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use sensor_models::HandState;

// ---------------------------------------------------------------------------
// Identifier types
// ---------------------------------------------------------------------------

/// Sensor-assigned body identifier. `TrackingId::NONE` (0) means "no body".
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TrackingId(pub u64);

impl TrackingId {
    pub const NONE: TrackingId = TrackingId(0);

    /// True for any id other than the unbound sentinel.
    pub fn is_bound(self) -> bool {
        self != Self::NONE
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// Index of the active body in the current frame; `None` = no active body.
pub type ActiveIndex = Option<usize>;

// ---------------------------------------------------------------------------
// Body records
// ---------------------------------------------------------------------------

/// The part of a sensor body slot the coordination loop cares about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub tracking_id: TrackingId,
    pub is_tracked: bool,
    pub hand_left_state: HandState,
    pub hand_right_state: HandState,
}

impl BodyRecord {
    /// An unoccupied slot.
    pub const EMPTY: BodyRecord = BodyRecord {
        tracking_id: TrackingId::NONE,
        is_tracked: false,
        hand_left_state: HandState::NotTracked,
        hand_right_state: HandState::NotTracked,
    };

    /// A tracked body with the given hand states.
    pub fn tracked(id: u64, left: HandState, right: HandState) -> Self {
        Self {
            tracking_id: TrackingId(id),
            is_tracked: true,
            hand_left_state: left,
            hand_right_state: right,
        }
    }

    /// At least one hand reports data.
    pub fn has_hand_data(&self) -> bool {
        self.hand_left_state.is_tracked() || self.hand_right_state.is_tracked()
    }

    /// Can become the active body when no current one is kept.
    pub fn is_eligible(&self) -> bool {
        self.is_tracked && self.has_hand_data()
    }
}

impl From<&RawBody> for BodyRecord {
    fn from(raw: &RawBody) -> Self {
        Self {
            tracking_id: TrackingId(raw.tracking_id),
            is_tracked: raw.is_tracked,
            hand_left_state: raw.hand_left_state,
            hand_right_state: raw.hand_right_state,
        }
    }
}

// ---------------------------------------------------------------------------
// BodyFrame: fixed-capacity, slot-ordered
// ---------------------------------------------------------------------------

/// One frame of body slots. Always exactly `capacity` slots long; slot order
/// is the sensor's and is stable across frames.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyFrame {
    slots: Vec<BodyRecord>,
}

impl BodyFrame {
    /// A frame with every slot empty.
    pub fn empty(capacity: usize) -> Self {
        Self {
            slots: vec![BodyRecord::EMPTY; capacity],
        }
    }

    /// Build a frame from the first `records.len()` slots, padding the rest
    /// with empty records.
    pub fn from_records(
        mut records: Vec<BodyRecord>,
        capacity: usize,
    ) -> Result<Self, IngestError> {
        if records.len() > capacity {
            return Err(IngestError::CapacityExceeded {
                got: records.len(),
                capacity,
            });
        }
        records.resize(capacity, BodyRecord::EMPTY);
        Ok(Self { slots: records })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, index: usize) -> Option<&BodyRecord> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BodyRecord> {
        self.slots.iter()
    }

    pub fn tracked_count(&self) -> usize {
        self.slots.iter().filter(|b| b.is_tracked).count()
    }
}
