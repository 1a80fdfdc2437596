//! Scenario definitions.
//!
//! Each scenario is a named arrangement of bodies in front of one sensor,
//! plus the sensor's unplug windows and the detector's behaviour.
//! All scenarios are deterministic given the same seed.

use crate::{
    detector::DetectorConfig,
    world::{GestureWindow, MotionSpec, SimBody, SimWorld},
};
use nalgebra::Vector3;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sensor_models::SensorParams;
use serde::{Deserialize, Serialize};

const GESTURES: [&str; 4] = ["Swipe", "Push", "Wave", "Raise"];

/// Which pre-defined scenario to load.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// One person standing still and performing two gestures
    Single,
    /// Several people walking through the scene
    Crowd,
    /// People leaving and re-entering, missed frames, late detector reports
    Dropout,
    /// One person, sensor unplugged mid-session
    Unplug,
    /// Bodies without hand data only; nobody is ever selected
    NoHands,
}

/// A fully configured simulation scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub duration: f64, // seconds
    pub tick_dt: f64,  // frame period (s)
    pub bodies: Vec<SimBody>,
    /// Sensor unplug windows `[start, end)` in sim time
    pub unplugged: Vec<(f64, f64)>,
    pub missed_frame_prob: f64,
    pub report_latency_ticks: usize,
}

impl Scenario {
    /// Build the named scenario. Uses `seed` for repeatability.
    pub fn build(kind: ScenarioKind, seed: u64) -> Self {
        match kind {
            ScenarioKind::Single => Self::single(seed),
            ScenarioKind::Crowd => Self::crowd(seed),
            ScenarioKind::Dropout => Self::dropout(seed),
            ScenarioKind::Unplug => Self::unplug(seed),
            ScenarioKind::NoHands => Self::no_hands(seed),
        }
    }

    /// A fresh world for this scenario.
    pub fn world(&self) -> SimWorld {
        SimWorld::new(
            SensorParams::default(),
            self.bodies.clone(),
            self.unplugged.clone(),
            self.missed_frame_prob,
            self.seed,
        )
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            latency_ticks: self.report_latency_ticks,
            ..Default::default()
        }
    }

    pub fn ticks(&self) -> u64 {
        (self.duration / self.tick_dt).round() as u64
    }

    // -----------------------------------------------------------------------
    // Single
    // -----------------------------------------------------------------------
    fn single(seed: u64) -> Self {
        let bodies = vec![body(
            1,
            [0.1, 0.0, 2.2],
            [0.0, 0.0, 0.0],
            MotionSpec::Stationary,
            vec![gesture(2.0, 3.0, "Swipe", 0.87), gesture(5.0, 6.5, "Push", 0.7)],
        )];

        Scenario {
            name: "single".into(),
            seed,
            duration: 8.0,
            tick_dt: 1.0 / 30.0,
            bodies,
            unplugged: Vec::new(),
            missed_frame_prob: 0.0,
            report_latency_ticks: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Crowd: people crossing the field of view at different times
    // -----------------------------------------------------------------------
    fn crowd(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));

        let bodies = (0..8)
            .map(|i| {
                let from_left = rng.gen_bool(0.5);
                let depth = rng.gen_range(1.2..4.0);
                let speed = rng.gen_range(0.4..1.2);
                let (x, vx) = if from_left {
                    (-3.0, speed)
                } else {
                    (3.0, -speed)
                };
                let appear = i as f64 * 3.0 + rng.gen_range(0.0..2.0);
                let gestures = (0..3)
                    .map(|_| {
                        let start = appear + rng.gen_range(1.0..6.0);
                        let name = GESTURES[rng.gen_range(0..GESTURES.len())];
                        let end = start + rng.gen_range(0.5..1.5);
                        gesture(start, end, name, rng.gen_range(0.5..0.95))
                    })
                    .collect();
                let mut b = body(
                    i as u64 + 1,
                    [x, 0.0, depth],
                    [vx, 0.0, 0.0],
                    MotionSpec::ConstantVelocity,
                    gestures,
                );
                b.appear_at = Some(appear);
                b.hands_tracked = rng.gen_bool(0.8);
                b
            })
            .collect();

        Scenario {
            name: "crowd".into(),
            seed,
            duration: 40.0,
            tick_dt: 1.0 / 30.0,
            bodies,
            unplugged: Vec::new(),
            missed_frame_prob: 0.02,
            report_latency_ticks: 1,
        }
    }

    // -----------------------------------------------------------------------
    // Dropout: the active person steps out of range and comes back
    // -----------------------------------------------------------------------
    fn dropout(seed: u64) -> Self {
        let walker = body(
            1,
            [0.0, 0.0, 2.0],
            [0.0, 0.0, 0.0],
            MotionSpec::Segmented {
                segments: vec![
                    (0.0, Vector3::zeros()),
                    (4.0, Vector3::new(0.0, 0.0, 2.0)), // backs out past max range
                    (6.0, Vector3::new(0.0, 0.0, -2.0)),
                    (8.0, Vector3::zeros()),
                ],
            },
            vec![
                gesture(1.0, 2.0, "Wave", 0.8),
                gesture(3.8, 4.6, "Swipe", 0.9),
                gesture(9.0, 10.0, "Push", 0.75),
            ],
        );
        let mut bystander = body(
            2,
            [-0.6, 0.0, 3.0],
            [0.0, 0.0, 0.0],
            MotionSpec::Stationary,
            vec![gesture(5.0, 5.8, "Raise", 0.6)],
        );
        bystander.appear_at = Some(3.0);
        bystander.disappear_at = Some(11.0);

        Scenario {
            name: "dropout".into(),
            seed,
            duration: 14.0,
            tick_dt: 1.0 / 30.0,
            bodies: vec![walker, bystander],
            unplugged: Vec::new(),
            missed_frame_prob: 0.15,
            report_latency_ticks: 3,
        }
    }

    // -----------------------------------------------------------------------
    // Unplug: sensor disconnects while a gesture is running
    // -----------------------------------------------------------------------
    fn unplug(seed: u64) -> Self {
        let bodies = vec![body(
            1,
            [0.0, 0.0, 2.5],
            [0.0, 0.0, 0.0],
            MotionSpec::Stationary,
            vec![gesture(2.0, 4.5, "Swipe", 0.85), gesture(7.0, 8.0, "Wave", 0.8)],
        )];

        Scenario {
            name: "unplug".into(),
            seed,
            duration: 10.0,
            tick_dt: 1.0 / 30.0,
            bodies,
            unplugged: vec![(3.0, 5.0)],
            missed_frame_prob: 0.0,
            report_latency_ticks: 1,
        }
    }

    // -----------------------------------------------------------------------
    // NoHands: tracked skeletons without usable hand data
    // -----------------------------------------------------------------------
    fn no_hands(seed: u64) -> Self {
        let bodies = [[0.0, 0.0, 2.0], [0.8, 0.0, 3.0]]
            .into_iter()
            .enumerate()
            .map(|(i, pos)| {
                let mut b = body(
                    i as u64 + 1,
                    pos,
                    [0.0, 0.0, 0.0],
                    MotionSpec::Stationary,
                    vec![gesture(1.0, 2.0, "Wave", 0.9)],
                );
                b.hands_tracked = false;
                b
            })
            .collect();

        Scenario {
            name: "no_hands".into(),
            seed,
            duration: 5.0,
            tick_dt: 1.0 / 30.0,
            bodies,
            unplugged: Vec::new(),
            missed_frame_prob: 0.0,
            report_latency_ticks: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder helpers
// ---------------------------------------------------------------------------

fn body(
    id: u64,
    pos: [f64; 3],
    vel: [f64; 3],
    motion: MotionSpec,
    gestures: Vec<GestureWindow>,
) -> SimBody {
    SimBody {
        id,
        position: Vector3::from(pos),
        velocity: Vector3::from(vel),
        motion,
        appear_at: None,
        disappear_at: None,
        hands_tracked: true,
        gestures,
    }
}

fn gesture(start: f64, end: f64, name: &str, confidence: f32) -> GestureWindow {
    GestureWindow {
        start,
        end,
        name: name.into(),
        confidence,
    }
}
