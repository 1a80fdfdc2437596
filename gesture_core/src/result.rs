//! Observable gesture result.
//!
//! # Reachable configurations
//! - **Untracked**:        `is_tracked=false, detected=false, confidence=-1, label=""`
//! - **TrackedNoGesture**: `is_tracked=true,  detected=false, confidence=0,  label unchanged`
//! - **TrackedGesture**:   `is_tracked=true,  detected=true,  confidence∈[0,1], label=name`
//!
//! Every update computes the next record in full and then diffs it field by
//! field against the current one. Subscribers receive one [`FieldChange`]
//! per field that actually changed; an identical update is silent.

use serde::{Deserialize, Serialize};

/// Confidence reported while no body is tracked. Not a measured value.
pub const UNTRACKED_CONFIDENCE: f32 = -1.0;

/// Snapshot of the result record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GestureResult {
    pub is_tracked: bool,
    pub detected: bool,
    pub confidence: f32,
    pub label: String,
}

impl GestureResult {
    pub fn untracked() -> Self {
        Self {
            is_tracked: false,
            detected: false,
            confidence: UNTRACKED_CONFIDENCE,
            label: String::new(),
        }
    }
}

/// Observable fields of [`GestureResult`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultField {
    IsTracked,
    Detected,
    Confidence,
    Label,
}

/// New value carried by a change notification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Bool(bool),
    Float(f32),
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: ResultField,
    pub value: FieldValue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&FieldChange) + Send>;

/// The result record plus its subscriber registry.
pub struct ResultStateStore {
    state: GestureResult,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for ResultStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStateStore {
    /// A store in the Untracked configuration with no subscribers.
    pub fn new() -> Self {
        Self {
            state: GestureResult::untracked(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn snapshot(&self) -> GestureResult {
        self.state.clone()
    }

    pub fn is_tracked(&self) -> bool {
        self.state.is_tracked
    }

    /// Register a callback invoked with every field change.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&FieldChange) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Apply one detection outcome. Returns the number of notifications sent.
    pub fn update(
        &mut self,
        is_body_valid: bool,
        is_gesture_detected: bool,
        detection_confidence: f32,
        gesture_name: &str,
    ) -> usize {
        let mut next = GestureResult {
            is_tracked: is_body_valid,
            confidence: 0.0,
            ..self.state.clone()
        };

        if !next.is_tracked {
            next.detected = false;
            next.confidence = UNTRACKED_CONFIDENCE;
            next.label.clear();
        } else {
            next.detected = is_gesture_detected;
            if next.detected {
                next.confidence = clamp_confidence(detection_confidence);
                next.label.clear();
                next.label.push_str(gesture_name);
            }
        }

        self.apply(next)
    }

    fn apply(&mut self, next: GestureResult) -> usize {
        let mut changes = Vec::with_capacity(4);
        if next.is_tracked != self.state.is_tracked {
            changes.push(FieldChange {
                field: ResultField::IsTracked,
                value: FieldValue::Bool(next.is_tracked),
            });
        }
        if next.detected != self.state.detected {
            changes.push(FieldChange {
                field: ResultField::Detected,
                value: FieldValue::Bool(next.detected),
            });
        }
        if next.confidence != self.state.confidence {
            changes.push(FieldChange {
                field: ResultField::Confidence,
                value: FieldValue::Float(next.confidence),
            });
        }
        if next.label != self.state.label {
            changes.push(FieldChange {
                field: ResultField::Label,
                value: FieldValue::Text(next.label.clone()),
            });
        }

        self.state = next;
        for change in &changes {
            for (_, subscriber) in &mut self.subscribers {
                subscriber(change);
            }
        }
        changes.len()
    }
}

/// Detector confidences outside [0, 1] (or NaN) are pinned into range.
fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
