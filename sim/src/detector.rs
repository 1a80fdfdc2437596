//! Simulated gesture detector.
//!
//! [`SimDetector`] is the control surface handed to the coordinator;
//! [`SimDetectorFeed`] is the engine side that reads the bound body's
//! gesture script and produces tagged [`DetectorReport`]s. Reports can be
//! delayed by a fixed number of ticks, so a report may reach the
//! coordinator after it has already rebound.

use crate::sensor::{lock, SharedWorld};
use gesture_core::{DetectorReport, GestureDetector, TrackingId};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::info;

#[derive(Debug)]
struct DetectorState {
    tracking_id: TrackingId,
    paused: bool,
    released: bool,
}

type SharedState = Arc<Mutex<DetectorState>>;

fn state(shared: &SharedState) -> MutexGuard<'_, DetectorState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tuning of the simulated engine.
#[derive(Clone, Debug)]
pub struct DetectorConfig {
    /// Ticks between producing a report and delivering it
    pub latency_ticks: usize,
    /// Half-width of the uniform noise added to scripted confidences
    pub confidence_noise: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            latency_ticks: 0,
            confidence_noise: 0.05,
        }
    }
}

pub struct SimDetector {
    shared: SharedState,
}

impl GestureDetector for SimDetector {
    fn tracking_id(&self) -> TrackingId {
        state(&self.shared).tracking_id
    }

    fn set_tracking_id(&mut self, id: TrackingId) {
        state(&self.shared).tracking_id = id;
    }

    fn is_paused(&self) -> bool {
        state(&self.shared).paused
    }

    fn set_paused(&mut self, paused: bool) {
        state(&self.shared).paused = paused;
    }

    fn release(self: Box<Self>) {
        state(&self.shared).released = true;
        info!("simulated gesture detector released");
    }
}

pub struct SimDetectorFeed {
    shared: SharedState,
    world: SharedWorld,
    config: DetectorConfig,
    pending: VecDeque<DetectorReport>,
    rng: ChaCha8Rng,
}

/// A fresh detector (unbound, paused) and the feed producing its reports.
pub fn sim_detector(
    world: SharedWorld,
    config: DetectorConfig,
    seed: u64,
) -> (SimDetector, SimDetectorFeed) {
    let shared = Arc::new(Mutex::new(DetectorState {
        tracking_id: TrackingId::NONE,
        paused: true,
        released: false,
    }));
    let feed = SimDetectorFeed {
        shared: shared.clone(),
        world,
        config,
        pending: VecDeque::new(),
        rng: ChaCha8Rng::seed_from_u64(seed),
    };
    (SimDetector { shared }, feed)
}

impl SimDetectorFeed {
    pub fn is_released(&self) -> bool {
        state(&self.shared).released
    }

    /// Run the engine for one tick and return the report due now, if any.
    pub fn poll(&mut self) -> Option<DetectorReport> {
        if let Some(report) = self.evaluate() {
            self.pending.push_back(report);
        }
        if self.pending.len() > self.config.latency_ticks {
            self.pending.pop_front()
        } else {
            None
        }
    }

    fn evaluate(&mut self) -> Option<DetectorReport> {
        let (id, paused, released) = {
            let s = state(&self.shared);
            (s.tracking_id, s.paused, s.released)
        };
        if paused || released || !id.is_bound() {
            return None;
        }

        let world = lock(&self.world);
        let Some(body) = world.body_by_tracking_id(id.0) else {
            return Some(DetectorReport::lost(id));
        };
        let report = match body.gesture_at(world.time()) {
            Some(gesture) => {
                let noise = self.config.confidence_noise;
                let jitter = if noise > 0.0 {
                    self.rng.gen_range(-noise..noise)
                } else {
                    0.0
                };
                DetectorReport::detected(id, gesture.confidence + jitter, &gesture.name)
            }
            None => DetectorReport::idle(id),
        };
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{GestureWindow, MotionSpec, SimBody, SimWorld};
    use nalgebra::Vector3;
    use sensor_models::SensorParams;

    fn world_with_gesture() -> SharedWorld {
        let body = SimBody {
            id: 1,
            position: Vector3::new(0.0, 0.0, 2.0),
            velocity: Vector3::zeros(),
            motion: MotionSpec::Stationary,
            appear_at: None,
            disappear_at: None,
            hands_tracked: true,
            gestures: vec![GestureWindow {
                start: 0.15,
                end: 0.45,
                name: "Swipe".into(),
                confidence: 0.8,
            }],
        };
        let mut world = SimWorld::new(SensorParams::default(), vec![body], Vec::new(), 0.0, 3);
        world.step(0.1);
        Arc::new(Mutex::new(world))
    }

    #[test]
    fn paused_detector_reports_nothing() {
        let (_detector, mut feed) =
            sim_detector(world_with_gesture(), DetectorConfig::default(), 1);
        for _ in 0..5 {
            assert!(feed.poll().is_none());
        }
    }

    #[test]
    fn bound_detector_follows_the_script() {
        let world = world_with_gesture();
        let (mut detector, mut feed) = sim_detector(world.clone(), DetectorConfig::default(), 1);
        detector.set_tracking_id(TrackingId(1));
        detector.set_paused(false);

        assert_eq!(feed.poll(), Some(DetectorReport::idle(TrackingId(1))));
        lock(&world).step(0.1);
        let report = feed.poll().unwrap();
        assert!(report.gesture_detected);
        assert_eq!(report.gesture_name, "Swipe");
        assert!((report.confidence - 0.8).abs() <= 0.051);
    }

    #[test]
    fn unknown_tracking_id_reports_lost_body() {
        let (mut detector, mut feed) =
            sim_detector(world_with_gesture(), DetectorConfig::default(), 1);
        detector.set_tracking_id(TrackingId(42));
        detector.set_paused(false);
        assert_eq!(feed.poll(), Some(DetectorReport::lost(TrackingId(42))));
    }

    #[test]
    fn latency_delays_delivery_and_keeps_producing_tag() {
        let config = DetectorConfig {
            latency_ticks: 2,
            confidence_noise: 0.0,
        };
        let (mut detector, mut feed) = sim_detector(world_with_gesture(), config, 1);
        detector.set_tracking_id(TrackingId(1));
        detector.set_paused(false);

        assert!(feed.poll().is_none());
        detector.set_tracking_id(TrackingId(9));
        assert!(feed.poll().is_none());
        // First report was produced while bound to body 1.
        assert_eq!(feed.poll().unwrap().tracking_id, TrackingId(1));
        assert_eq!(feed.poll().unwrap().tracking_id, TrackingId(9));
    }

    #[test]
    fn release_is_visible_to_the_feed() {
        let (detector, feed) = sim_detector(world_with_gesture(), DetectorConfig::default(), 1);
        let detector: Box<dyn GestureDetector> = Box::new(detector);
        assert!(!feed.is_released());
        detector.release();
        assert!(feed.is_released());
    }
}
