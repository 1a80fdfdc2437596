//! Coordinator actor.
//!
//! [`spawn_coordinator`] moves a [`Coordinator`] onto its own thread. Frame
//! readers, detector callbacks and availability watchers hold cloned
//! [`EventSender`]s and push [`CoordinatorEvent`]s onto one bounded queue;
//! the actor applies them one at a time, so a frame update and a detector
//! update never interleave on the result record.
//!
//! Frames are offered without blocking and dropped when the queue is full.
//! Reports and availability changes wait for queue space.

use crate::{
    coordinator::{Coordinator, CoordinatorEvent, CoordinatorSnapshot},
    detector::DetectorReport,
    metrics::SessionStats,
    types::BodyFrame,
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use sensor_models::SensorStatus;
use std::{
    io,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread,
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Command queue depth shared by all producers
    pub queue_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { queue_capacity: 8 }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to spawn coordinator thread")]
    Spawn(#[from] io::Error),
    #[error("coordinator thread is no longer running")]
    Disconnected,
    #[error("coordinator thread panicked")]
    Panicked,
}

enum Command {
    Event(CoordinatorEvent),
    Snapshot(Sender<CoordinatorSnapshot>),
    Shutdown,
}

/// Producer side of the coordinator queue. Cheap to clone.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<Command>,
    dropped: Arc<AtomicU64>,
}

impl EventSender {
    /// Offer a frame tick without blocking. Returns `Ok(false)` if the queue
    /// was full and the tick was dropped. Only dropped frames are counted; a
    /// dropped empty tick is lost silently.
    pub fn offer_frame(&self, frame: Option<BodyFrame>) -> Result<bool, RuntimeError> {
        let event = match frame {
            Some(frame) => CoordinatorEvent::Frame(frame),
            None => CoordinatorEvent::NoFrame,
        };
        match self.tx.try_send(Command::Event(event)) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(Command::Event(CoordinatorEvent::Frame(_)))) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(dropped_total = dropped, "coordinator queue full, dropping frame");
                Ok(false)
            }
            Err(TrySendError::Full(_)) => Ok(false),
            Err(TrySendError::Disconnected(_)) => Err(RuntimeError::Disconnected),
        }
    }

    /// Deliver a detector report.
    pub fn report(&self, report: DetectorReport) -> Result<(), RuntimeError> {
        self.send(CoordinatorEvent::Report(report))
    }

    /// Deliver a sensor availability change.
    pub fn availability(&self, status: SensorStatus) -> Result<(), RuntimeError> {
        self.send(CoordinatorEvent::Availability(status))
    }

    /// Frames dropped so far because the queue was full.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn send(&self, event: CoordinatorEvent) -> Result<(), RuntimeError> {
        self.tx
            .send(Command::Event(event))
            .map_err(|_| RuntimeError::Disconnected)
    }
}

/// Owner-side handle of a running coordinator actor.
pub struct CoordinatorHandle {
    sender: EventSender,
    join: thread::JoinHandle<SessionStats>,
}

impl CoordinatorHandle {
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Snapshot taken after every event queued before this call.
    pub fn snapshot(&self) -> Result<CoordinatorSnapshot, RuntimeError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.sender
            .tx
            .send(Command::Snapshot(reply_tx))
            .map_err(|_| RuntimeError::Disconnected)?;
        let mut snapshot = reply_rx.recv().map_err(|_| RuntimeError::Disconnected)?;
        snapshot.stats.frames_dropped = self.sender.dropped_frames();
        Ok(snapshot)
    }

    /// Drain the queue, release the detector and return the final statistics.
    pub fn shutdown(self) -> Result<SessionStats, RuntimeError> {
        // A dead actor has already dropped its receiver; join reports why.
        let _ = self.sender.tx.send(Command::Shutdown);
        let mut stats = self.join.join().map_err(|_| RuntimeError::Panicked)?;
        stats.frames_dropped = self.sender.dropped_frames();
        Ok(stats)
    }
}

/// Move `coordinator` onto a dedicated thread.
pub fn spawn_coordinator(
    coordinator: Coordinator,
    config: RuntimeConfig,
) -> Result<CoordinatorHandle, RuntimeError> {
    let (tx, rx) = bounded(config.queue_capacity.max(1));
    let join = thread::Builder::new()
        .name("gesture-coordinator".into())
        .spawn(move || run_actor(coordinator, rx))?;
    info!(queue_capacity = config.queue_capacity, "coordinator actor started");
    Ok(CoordinatorHandle {
        sender: EventSender {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        join,
    })
}

fn run_actor(mut coordinator: Coordinator, rx: Receiver<Command>) -> SessionStats {
    while let Ok(command) = rx.recv() {
        match command {
            Command::Event(event) => coordinator.handle(&event),
            Command::Snapshot(reply) => {
                let _ = reply.send(coordinator.snapshot());
            }
            Command::Shutdown => break,
        }
    }
    coordinator.shutdown()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coordinator::CoordinatorConfig,
        detector::{DetectorCall, RecordingDetector},
        result::GestureResult,
        types::{BodyRecord, HandState, TrackingId},
    };

    fn frame_with(id: u64) -> BodyFrame {
        BodyFrame::from_records(
            vec![BodyRecord::tracked(id, HandState::Open, HandState::NotTracked)],
            6,
        )
        .unwrap()
    }

    #[test]
    fn events_from_several_producers_are_serialised() {
        let (detector, calls) = RecordingDetector::new();
        let coord = Coordinator::new(CoordinatorConfig::default(), Box::new(detector));
        let handle = spawn_coordinator(
            coord,
            RuntimeConfig {
                queue_capacity: 64,
            },
        )
        .unwrap();

        let frames = handle.sender();
        let reports = handle.sender();
        assert!(frames.offer_frame(Some(frame_with(5))).unwrap());
        // Wait for the frame to be applied before reporting against its binding.
        assert_eq!(handle.snapshot().unwrap().bound, TrackingId(5));

        let producer = thread::spawn(move || {
            reports
                .report(DetectorReport::detected(TrackingId(5), 0.87, "Swipe"))
                .unwrap();
        });
        producer.join().unwrap();

        let snap = handle.snapshot().unwrap();
        assert_eq!(
            snap.result,
            GestureResult {
                is_tracked: true,
                detected: true,
                confidence: 0.87,
                label: "Swipe".into(),
            }
        );

        let stats = handle.shutdown().unwrap();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.reports_applied, 1);
        assert_eq!(calls.lock().unwrap().last(), Some(&DetectorCall::Release));
    }

    #[test]
    fn availability_loss_collapses_result() {
        let (detector, _calls) = RecordingDetector::new();
        let coord = Coordinator::new(CoordinatorConfig::default(), Box::new(detector));
        let handle = spawn_coordinator(coord, RuntimeConfig::default()).unwrap();
        let sender = handle.sender();

        sender.offer_frame(Some(frame_with(5))).unwrap();
        sender
            .report(DetectorReport::detected(TrackingId(5), 0.5, "Wave"))
            .unwrap();
        sender.availability(SensorStatus::NotAvailable).unwrap();

        let snap = handle.snapshot().unwrap();
        assert_eq!(snap.status, SensorStatus::NotAvailable);
        assert_eq!(snap.result, GestureResult::untracked());
        assert!(snap.paused);
        handle.shutdown().unwrap();
    }

    #[test]
    fn full_queue_drops_and_counts_frames() {
        let (detector, _calls) = RecordingDetector::new();
        let mut coord = Coordinator::new(CoordinatorConfig::default(), Box::new(detector));

        // Park the actor inside a status callback until the gate opens.
        let (entered_tx, entered_rx) = bounded::<()>(1);
        let (gate_tx, gate_rx) = bounded::<()>(1);
        coord.subscribe_status(move |_| {
            let _ = entered_tx.send(());
            let _ = gate_rx.recv();
        });
        let handle = spawn_coordinator(coord, RuntimeConfig { queue_capacity: 1 }).unwrap();
        let sender = handle.sender();

        sender.availability(SensorStatus::NotAvailable).unwrap();
        entered_rx.recv().unwrap();

        assert!(sender.offer_frame(Some(frame_with(5))).unwrap());
        assert!(!sender.offer_frame(Some(frame_with(5))).unwrap());
        assert!(!sender.offer_frame(None).unwrap());
        assert_eq!(sender.dropped_frames(), 1);

        gate_tx.send(()).unwrap();
        let snap = handle.snapshot().unwrap();
        assert_eq!(snap.stats.frames, 1);
        assert_eq!(snap.stats.empty_ticks, 0);
        assert_eq!(snap.stats.frames_dropped, 1);

        let stats = handle.shutdown().unwrap();
        assert_eq!(stats.frames_dropped, 1);
    }

    #[test]
    fn sender_fails_after_shutdown() {
        let (detector, _calls) = RecordingDetector::new();
        let coord = Coordinator::new(CoordinatorConfig::default(), Box::new(detector));
        let handle = spawn_coordinator(coord, RuntimeConfig::default()).unwrap();
        let sender = handle.sender();
        handle.shutdown().unwrap();

        assert!(matches!(
            sender.report(DetectorReport::idle(TrackingId(1))),
            Err(RuntimeError::Disconnected)
        ));
        assert!(matches!(
            sender.offer_frame(None),
            Err(RuntimeError::Disconnected)
        ));
    }
}
