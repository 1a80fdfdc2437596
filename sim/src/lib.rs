//! `sim` — Scenario simulator: bodies in front of a sensor, a scripted
//! gesture detector, scenario runners and session replay.

pub mod detector;
pub mod replay;
pub mod runner;
pub mod scenarios;
pub mod sensor;
pub mod world;

pub use detector::{sim_detector, DetectorConfig, SimDetector, SimDetectorFeed};
pub use replay::{load_log, replay, save_log, SessionLog, TimedEvent};
pub use runner::{run_sync, run_threaded, RunSummary};
pub use scenarios::{Scenario, ScenarioKind};
pub use sensor::{SharedWorld, SimBodyReader, SimSensor};
pub use world::{GestureWindow, MotionSpec, SimBody, SimWorld};
