//! Simulated scene in front of the sensor.
//!
//! The sensor sits at the origin looking down +z. Each [`SimBody`] moves
//! according to its [`MotionSpec`] and is visible while it is active and
//! inside the sensor's range and horizontal field of view. Visible bodies
//! occupy body slots lowest-free-first; a body that leaves frees its slot
//! and gets a fresh tracking id when it is picked up again.

use nalgebra::Vector3;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sensor_models::{HandState, RawBody, SensorParams, SensorStatus};
use serde::{Deserialize, Serialize};

/// How a body moves between ticks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MotionSpec {
    Stationary,
    /// Keep the initial velocity.
    ConstantVelocity,
    /// Switch velocity at given sim times, sorted ascending. The active
    /// velocity is the last one whose start time is <= t.
    Segmented { segments: Vec<(f64, Vector3<f64>)> },
}

/// A gesture the body performs over `[start, end)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GestureWindow {
    pub start: f64,
    pub end: f64,
    pub name: String,
    /// Mean detector confidence while the gesture runs
    pub confidence: f32,
}

impl GestureWindow {
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// A simulated person with ground-truth position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimBody {
    /// Script id, stable for the whole scenario (not the sensor tracking id)
    pub id: u64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub motion: MotionSpec,
    pub appear_at: Option<f64>,
    pub disappear_at: Option<f64>,
    /// Whether the sensor resolves this body's hands
    pub hands_tracked: bool,
    pub gestures: Vec<GestureWindow>,
}

impl SimBody {
    /// Propagate the position by `dt` seconds.
    pub fn step(&mut self, t: f64, dt: f64) {
        match &self.motion {
            MotionSpec::Stationary => {}
            MotionSpec::ConstantVelocity => {
                self.position += self.velocity * dt;
            }
            MotionSpec::Segmented { segments } => {
                if let Some((_, v)) = segments.iter().filter(|(start, _)| *start <= t).last() {
                    self.velocity = *v;
                }
                self.position += self.velocity * dt;
            }
        }
    }

    /// True if the body is part of the scene at time `t`.
    pub fn is_active(&self, t: f64) -> bool {
        if let Some(appear) = self.appear_at {
            if t < appear {
                return false;
            }
        }
        if let Some(disappear) = self.disappear_at {
            if t >= disappear {
                return false;
            }
        }
        true
    }

    pub fn gesture_at(&self, t: f64) -> Option<&GestureWindow> {
        self.gestures.iter().find(|g| g.contains(t))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slot {
    body: usize,
    tracking_id: u64,
}

/// Bodies, sensor geometry and the slot table the sensor reports.
#[derive(Clone, Debug)]
pub struct SimWorld {
    params: SensorParams,
    bodies: Vec<SimBody>,
    slots: Vec<Option<Slot>>,
    /// Sim-time windows `[start, end)` during which the sensor is unplugged
    unplugged: Vec<(f64, f64)>,
    missed_frame_prob: f64,
    next_tracking_id: u64,
    frame_seq: u64,
    time: f64,
    rng: ChaCha8Rng,
}

impl SimWorld {
    pub fn new(
        params: SensorParams,
        bodies: Vec<SimBody>,
        unplugged: Vec<(f64, f64)>,
        missed_frame_prob: f64,
        seed: u64,
    ) -> Self {
        Self {
            slots: vec![None; params.max_bodies],
            params,
            bodies,
            unplugged,
            missed_frame_prob,
            next_tracking_id: 0,
            frame_seq: 0,
            time: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn params(&self) -> &SensorParams {
        &self.params
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Sequence number of the latest produced frame. Bumped once per step
    /// unless the frame was missed or the sensor is unplugged.
    pub fn frame_seq(&self) -> u64 {
        self.frame_seq
    }

    pub fn is_unplugged(&self) -> bool {
        self.unplugged
            .iter()
            .any(|(start, end)| self.time >= *start && self.time < *end)
    }

    pub fn status(&self) -> SensorStatus {
        if self.is_unplugged() {
            SensorStatus::NotAvailable
        } else {
            SensorStatus::Running
        }
    }

    /// Inside range and horizontal field of view.
    pub fn in_view(&self, position: &Vector3<f64>) -> bool {
        let depth = position.z;
        if depth < self.params.min_range || depth > self.params.max_range {
            return false;
        }
        position.x.atan2(depth).abs() <= self.params.fov_half
    }

    fn is_visible(&self, index: usize) -> bool {
        let body = &self.bodies[index];
        body.is_active(self.time) && self.in_view(&body.position)
    }

    /// Advance the scene by `dt` and refresh the slot table.
    pub fn step(&mut self, dt: f64) {
        let t = self.time;
        for body in &mut self.bodies {
            body.step(t, dt);
        }
        self.time += dt;

        if self.is_unplugged() {
            // The sensor forgets every body while disconnected.
            self.slots.iter_mut().for_each(|slot| *slot = None);
            return;
        }

        let visible: Vec<bool> = (0..self.bodies.len()).map(|i| self.is_visible(i)).collect();
        for slot in &mut self.slots {
            if matches!(slot, Some(s) if !visible[s.body]) {
                *slot = None;
            }
        }
        for (index, _) in visible.iter().enumerate().filter(|(_, v)| **v) {
            if self.slot_of(index).is_some() {
                continue;
            }
            let Some(free) = self.slots.iter().position(Option::is_none) else {
                break;
            };
            self.next_tracking_id += 1;
            self.slots[free] = Some(Slot {
                body: index,
                tracking_id: self.next_tracking_id,
            });
        }

        if self.rng.gen::<f64>() >= self.missed_frame_prob {
            self.frame_seq += 1;
        }
    }

    fn slot_of(&self, body: usize) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(s) if s.body == body))
    }

    /// Tracking id currently assigned to the body with script id `id`.
    pub fn tracking_id_of(&self, id: u64) -> Option<u64> {
        self.slots
            .iter()
            .flatten()
            .find(|s| self.bodies[s.body].id == id)
            .map(|s| s.tracking_id)
    }

    /// Body currently tracked under sensor `tracking_id`.
    pub fn body_by_tracking_id(&self, tracking_id: u64) -> Option<&SimBody> {
        self.slots
            .iter()
            .flatten()
            .find(|s| s.tracking_id == tracking_id)
            .map(|s| &self.bodies[s.body])
    }

    /// The current slot table as the sensor would report it.
    pub fn raw_bodies(&self) -> Vec<RawBody> {
        self.slots
            .iter()
            .map(|slot| match slot {
                Some(s) => self.raw_body(s),
                None => RawBody::empty(),
            })
            .collect()
    }

    fn raw_body(&self, slot: &Slot) -> RawBody {
        let body = &self.bodies[slot.body];
        let (left, right) = if !body.hands_tracked {
            (HandState::NotTracked, HandState::NotTracked)
        } else if body.gesture_at(self.time).is_some() {
            (HandState::Open, HandState::Closed)
        } else {
            (HandState::Open, HandState::Open)
        };
        RawBody {
            tracking_id: slot.tracking_id,
            is_tracked: true,
            hand_left_state: left,
            hand_right_state: right,
            position: [body.position.x, body.position.y, body.position.z],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(id: u64, x: f64, z: f64) -> SimBody {
        SimBody {
            id,
            position: Vector3::new(x, 0.0, z),
            velocity: Vector3::zeros(),
            motion: MotionSpec::Stationary,
            appear_at: None,
            disappear_at: None,
            hands_tracked: true,
            gestures: Vec::new(),
        }
    }

    fn world(bodies: Vec<SimBody>) -> SimWorld {
        SimWorld::new(SensorParams::default(), bodies, Vec::new(), 0.0, 1)
    }

    #[test]
    fn field_of_view_and_range() {
        let w = world(Vec::new());
        assert!(w.in_view(&Vector3::new(0.0, 0.0, 2.0)));
        assert!(!w.in_view(&Vector3::new(0.0, 0.0, 0.2)));
        assert!(!w.in_view(&Vector3::new(0.0, 0.0, 6.0)));
        // 45 degrees off axis, outside a 35 degree half-angle
        assert!(!w.in_view(&Vector3::new(2.0, 0.0, 2.0)));
    }

    #[test]
    fn slots_fill_lowest_first_with_fresh_ids() {
        let mut late = standing(2, 0.5, 2.0);
        late.appear_at = Some(0.5);
        let mut w = world(vec![standing(1, 0.0, 2.0), late]);

        w.step(0.1);
        let raw = w.raw_bodies();
        assert_eq!(raw.len(), 6);
        assert_eq!(raw[0].tracking_id, 1);
        assert_eq!(raw[1].tracking_id, 0);

        for _ in 0..5 {
            w.step(0.1);
        }
        assert_eq!(w.raw_bodies()[1].tracking_id, 2);
        assert_eq!(w.tracking_id_of(2), Some(2));
    }

    #[test]
    fn returning_body_gets_new_id_and_reuses_slot() {
        let mut walker = standing(1, 0.0, 2.0);
        walker.motion = MotionSpec::Segmented {
            segments: vec![
                (0.0, Vector3::zeros()),
                (1.0, Vector3::new(0.0, 0.0, 5.0)),
                (2.0, Vector3::new(0.0, 0.0, -5.0)),
                (3.0, Vector3::zeros()),
            ],
        };
        let mut w = world(vec![walker]);

        w.step(0.1);
        let first = w.raw_bodies()[0].tracking_id;
        assert_ne!(first, 0);

        let mut left_view = false;
        while w.time() < 4.0 {
            w.step(0.1);
            left_view |= w.raw_bodies()[0].tracking_id == 0;
        }
        assert!(left_view);
        let second = w.raw_bodies()[0].tracking_id;
        assert!(second != 0 && second != first);
    }

    #[test]
    fn unplug_window_clears_slots_and_stops_frames() {
        let mut w = SimWorld::new(
            SensorParams::default(),
            vec![standing(1, 0.0, 2.0)],
            vec![(0.25, 0.55)],
            0.0,
            1,
        );
        w.step(0.1);
        assert_eq!(w.status(), SensorStatus::Running);

        while w.time() < 0.3 {
            w.step(0.1);
        }
        let seq = w.frame_seq();
        assert_eq!(w.status(), SensorStatus::NotAvailable);
        assert!(w.raw_bodies().iter().all(|b| b.tracking_id == 0));
        w.step(0.1);
        assert_eq!(w.frame_seq(), seq);

        while w.time() < 0.6 {
            w.step(0.1);
        }
        assert_eq!(w.status(), SensorStatus::Running);
        assert_ne!(w.raw_bodies()[0].tracking_id, 0);
    }

    #[test]
    fn hand_states_follow_gestures() {
        let mut body = standing(1, 0.0, 2.0);
        body.gestures.push(GestureWindow {
            start: 0.15,
            end: 0.35,
            name: "Swipe".into(),
            confidence: 0.9,
        });
        let mut hidden = standing(2, 0.3, 2.5);
        hidden.hands_tracked = false;
        let mut w = world(vec![body, hidden]);

        w.step(0.1);
        assert_eq!(w.raw_bodies()[0].hand_right_state, HandState::Open);
        assert_eq!(w.raw_bodies()[1].hand_left_state, HandState::NotTracked);
        w.step(0.1);
        assert_eq!(w.raw_bodies()[0].hand_right_state, HandState::Closed);
    }
}
