//! Replay: serialize/deserialize coordinator event logs and re-run them
//! offline against a fresh coordinator.

use gesture_core::{
    Coordinator, CoordinatorConfig, CoordinatorEvent, GestureResult, RecordingDetector,
    SessionStats,
};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A full recorded session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionLog {
    pub scenario_name: String,
    pub seed: u64,
    pub tick_dt: f64,
    /// Every event the coordinator processed, in order
    pub events: Vec<TimedEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub time: f64,
    pub event: CoordinatorEvent,
}

impl SessionLog {
    pub fn new(scenario_name: &str, seed: u64, tick_dt: f64) -> Self {
        Self {
            scenario_name: scenario_name.to_owned(),
            seed,
            tick_dt,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, time: f64, event: CoordinatorEvent) {
        self.events.push(TimedEvent { time, event });
    }
}

/// Save a session log to a JSON file.
pub fn save_log(log: &SessionLog, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}

/// Load a session log from a JSON file.
pub fn load_log(path: &Path) -> anyhow::Result<SessionLog> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let log: SessionLog = serde_json::from_reader(reader)?;
    Ok(log)
}

/// Feed every logged event through a fresh coordinator driving a recording
/// detector. Returns the final result and the session statistics.
pub fn replay(log: &SessionLog) -> (GestureResult, SessionStats) {
    let (detector, _calls) = RecordingDetector::new();
    let mut coordinator = Coordinator::new(CoordinatorConfig::default(), Box::new(detector));
    for timed in &log.events {
        coordinator.handle(&timed.event);
    }
    let result = coordinator.results().snapshot();
    (result, coordinator.shutdown())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_core::{BodyFrame, BodyRecord, DetectorReport, HandState, TrackingId};
    use sensor_models::SensorStatus;

    fn sample_log() -> SessionLog {
        let frame = BodyFrame::from_records(
            vec![BodyRecord::tracked(5, HandState::Open, HandState::NotTracked)],
            6,
        )
        .unwrap();
        let mut log = SessionLog::new("sample", 3, 0.1);
        log.push(0.1, CoordinatorEvent::Frame(frame));
        let hit = DetectorReport::detected(TrackingId(5), 0.87, "Swipe");
        log.push(0.1, CoordinatorEvent::Report(hit));
        log.push(0.2, CoordinatorEvent::NoFrame);
        log.push(0.3, CoordinatorEvent::Report(DetectorReport::idle(TrackingId(4))));
        log
    }

    #[test]
    fn replay_applies_events_in_order() {
        let (result, stats) = replay(&sample_log());
        assert_eq!(
            result,
            GestureResult {
                is_tracked: true,
                detected: true,
                confidence: 0.87,
                label: "Swipe".into(),
            }
        );
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.empty_ticks, 1);
        assert_eq!(stats.reports_applied, 1);
        assert_eq!(stats.reports_stale, 1);
    }

    #[test]
    fn saved_log_loads_back() {
        let mut log = sample_log();
        log.push(0.4, CoordinatorEvent::Availability(SensorStatus::NotAvailable));
        let path = std::env::temp_dir().join(format!("gesture_log_{}.json", std::process::id()));

        save_log(&log, &path).unwrap();
        let loaded = load_log(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.scenario_name, "sample");
        assert_eq!(loaded.events, log.events);
        assert_eq!(replay(&loaded).0, GestureResult::untracked());
    }
}
