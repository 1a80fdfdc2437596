//! Scenario runners.
//!
//! [`run_sync`] drives a [`Session`] tick by tick on the calling thread and
//! records every coordinator event into a [`SessionLog`]. [`run_threaded`]
//! moves the coordinator onto its actor thread, feeds frames from the
//! calling thread and detector reports from a second thread.

use crate::{
    detector::{sim_detector, SimDetectorFeed},
    replay::SessionLog,
    scenarios::Scenario,
    sensor::{lock, SharedWorld, SimSensor},
};
use anyhow::Context;
use crossbeam_channel::bounded;
use gesture_core::{
    spawn_coordinator, Coordinator, CoordinatorConfig, CoordinatorEvent, FrameIngestor,
    GestureDetector, GestureResult, ReportOutcome, RuntimeConfig, Session, SessionStats,
};
use sensor_models::{Sensor, SensorStatus};
use serde::Serialize;
use std::{
    sync::{Arc, Mutex},
    thread,
    time::Instant,
};
use tracing::{debug, info};

/// Outcome of one scenario run.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub seed: u64,
    pub ticks: u64,
    pub elapsed_s: f64,
    /// Detector reports carrying a detected gesture that were applied
    pub gestures_applied: u64,
    pub final_result: GestureResult,
    pub stats: SessionStats,
    /// Whether the coordinator released the detector on shutdown
    pub detector_released: bool,
}

fn shared_world(scenario: &Scenario) -> SharedWorld {
    Arc::new(Mutex::new(scenario.world()))
}

/// Run `scenario` synchronously. Returns the summary and the event log.
pub fn run_sync(scenario: &Scenario) -> anyhow::Result<(RunSummary, SessionLog)> {
    let world = shared_world(scenario);
    let (detector, mut feed) =
        sim_detector(world.clone(), scenario.detector_config(), scenario.seed);
    let sensor = SimSensor::new(world.clone());

    let mut session = Session::start(Box::new(sensor), CoordinatorConfig::default(), move |_| {
        let detector: Box<dyn GestureDetector> = Box::new(detector);
        Ok(detector)
    })
    .context("starting gesture session")?;

    let mut log = SessionLog::new(&scenario.name, scenario.seed, scenario.tick_dt);
    let mut status = SensorStatus::Running;
    if session.coordinator().status() != status {
        status = session.coordinator().status();
        log.push(0.0, CoordinatorEvent::Availability(status));
    }

    let start = Instant::now();
    let ticks = scenario.ticks();
    let mut gestures_applied = 0u64;

    for _ in 0..ticks {
        let time = {
            let mut w = lock(&world);
            w.step(scenario.tick_dt);
            w.time()
        };

        let tick = session.tick()?;
        if tick.status != status {
            status = tick.status;
            log.push(time, CoordinatorEvent::Availability(status));
        }
        let event = match tick.frame {
            Some(frame) => CoordinatorEvent::Frame(frame),
            None => CoordinatorEvent::NoFrame,
        };
        log.push(time, event);

        if let Some(report) = feed.poll() {
            let outcome = session.report(&report);
            if report.gesture_detected && matches!(outcome, ReportOutcome::Applied { .. }) {
                gestures_applied += 1;
            }
            log.push(time, CoordinatorEvent::Report(report));
        }
    }

    let final_result = session.coordinator().results().snapshot();
    let stats = session.close();
    let detector_released = feed.is_released();

    let summary = RunSummary {
        scenario: scenario.name.clone(),
        seed: scenario.seed,
        ticks,
        elapsed_s: start.elapsed().as_secs_f64(),
        gestures_applied,
        final_result,
        stats,
        detector_released,
    };
    info!(
        scenario = %summary.scenario,
        frames = summary.stats.frames,
        rebinds = summary.stats.rebinds,
        "scenario finished"
    );
    Ok((summary, log))
}

/// Run `scenario` with the coordinator on its actor thread.
///
/// Frames are offered without blocking, so a slow coordinator drops frames
/// instead of stalling the reader. Results are not reproducible tick for
/// tick, which is why no event log is produced.
pub fn run_threaded(scenario: &Scenario, runtime: RuntimeConfig) -> anyhow::Result<RunSummary> {
    let world = shared_world(scenario);
    let (detector, feed) = sim_detector(world.clone(), scenario.detector_config(), scenario.seed);

    let mut sensor = SimSensor::new(world.clone());
    sensor.open().context("opening simulated sensor")?;
    let mut reader = sensor.open_body_reader()?;
    let ingestor = FrameIngestor::new(sensor.params().max_bodies);

    let mut coordinator = Coordinator::new(CoordinatorConfig::default(), Box::new(detector));
    let mut status = sensor.status();
    coordinator.on_availability(status);
    let handle = spawn_coordinator(coordinator, runtime)?;

    // The detector engine runs on its own thread, paced by frame ticks.
    let (tick_tx, tick_rx) = bounded::<()>(1);
    let reports = handle.sender();
    let engine = thread::Builder::new()
        .name("sim-detector".into())
        .spawn(move || run_engine(feed, tick_rx, reports))?;

    let start = Instant::now();
    let ticks = scenario.ticks();
    let frames = handle.sender();
    for _ in 0..ticks {
        lock(&world).step(scenario.tick_dt);

        let now = sensor.status();
        if now != status {
            status = now;
            frames.availability(status)?;
        }
        let frame = if status.is_available() {
            ingestor.poll(reader.as_mut())?
        } else {
            None
        };
        frames.offer_frame(frame)?;
        tick_tx.send(()).context("detector thread stopped")?;
    }

    drop(tick_tx);
    let (gestures_applied, feed) = engine
        .join()
        .map_err(|_| anyhow::anyhow!("detector thread panicked"))??;

    let final_result = handle.snapshot()?.result;
    reader.close();
    let stats = handle.shutdown()?;
    sensor.close();
    let detector_released = feed.is_released();

    Ok(RunSummary {
        scenario: scenario.name.clone(),
        seed: scenario.seed,
        ticks,
        elapsed_s: start.elapsed().as_secs_f64(),
        gestures_applied,
        final_result,
        stats,
        detector_released,
    })
}

/// Poll the feed once per tick until the tick channel closes. Returns the
/// number of detected-gesture reports sent and the feed itself.
fn run_engine(
    mut feed: SimDetectorFeed,
    ticks: crossbeam_channel::Receiver<()>,
    reports: gesture_core::EventSender,
) -> anyhow::Result<(u64, SimDetectorFeed)> {
    let mut sent = 0;
    while ticks.recv().is_ok() {
        if let Some(report) = feed.poll() {
            if report.gesture_detected {
                sent += 1;
            }
            reports.report(report)?;
        }
    }
    debug!(sent, "detector engine stopped");
    Ok((sent, feed))
}
