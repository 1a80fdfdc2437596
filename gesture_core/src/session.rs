//! Session lifecycle: ordered acquisition and teardown of the sensor, its
//! body reader and the gesture detector around one [`Coordinator`].
//!
//! Start order is sensor → body reader → detector; [`Session::close`] runs
//! the exact reverse. A failure part-way through start closes whatever was
//! already opened.

use crate::{
    coordinator::{Coordinator, CoordinatorConfig, ReportOutcome, TickOutput},
    detector::{DetectorReport, GestureDetector},
    ingest::{FrameIngestor, IngestError},
    metrics::SessionStats,
    types::BodyFrame,
};
use sensor_models::{BodyFrameSource, Sensor, SensorError, SensorStatus};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Sensor(#[from] SensorError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("failed to construct gesture detector: {0}")]
    Detector(String),
}

/// What one [`Session::tick`] observed and did.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub status: SensorStatus,
    /// The ingested frame, if one was ready
    pub frame: Option<BodyFrame>,
    pub output: Option<TickOutput>,
}

pub struct Session {
    sensor: Box<dyn Sensor>,
    reader: Box<dyn BodyFrameSource>,
    ingestor: FrameIngestor,
    coordinator: Coordinator,
}

impl Session {
    /// Open `sensor`, open its body reader, then build the detector with
    /// `make_detector`.
    pub fn start<F>(
        mut sensor: Box<dyn Sensor>,
        config: CoordinatorConfig,
        make_detector: F,
    ) -> Result<Self, SessionError>
    where
        F: FnOnce(&mut dyn Sensor) -> Result<Box<dyn GestureDetector>, SessionError>,
    {
        if let Err(e) = sensor.open() {
            warn!(error = %e, "sensor failed to open");
            sensor.close();
            return Err(e.into());
        }

        let mut reader = match sensor.open_body_reader() {
            Ok(reader) => reader,
            Err(e) => {
                warn!(error = %e, "body reader failed to open");
                sensor.close();
                return Err(e.into());
            }
        };

        let detector = match make_detector(sensor.as_mut()) {
            Ok(detector) => detector,
            Err(e) => {
                warn!(error = %e, "gesture detector construction failed");
                reader.close();
                sensor.close();
                return Err(e);
            }
        };

        let ingestor = FrameIngestor::new(sensor.params().max_bodies);
        let mut coordinator = Coordinator::new(config, detector);
        coordinator.on_availability(sensor.status());
        info!(
            max_bodies = ingestor.capacity(),
            status = sensor.status().label(),
            "gesture session started"
        );

        Ok(Self {
            sensor,
            reader,
            ingestor,
            coordinator,
        })
    }

    /// One frame-arrival tick: refresh availability, poll the reader and run
    /// the coordinator over whatever arrived.
    pub fn tick(&mut self) -> Result<Tick, SessionError> {
        let status = self.sensor.status();
        self.coordinator.on_availability(status);

        let frame = if status.is_available() {
            self.ingestor.poll(self.reader.as_mut())?
        } else {
            None
        };
        let output = self.coordinator.on_frame(frame.as_ref());

        Ok(Tick {
            status,
            frame,
            output,
        })
    }

    /// Forward a detector report to the coordinator.
    pub fn report(&mut self, report: &DetectorReport) -> ReportOutcome {
        self.coordinator.on_report(report)
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Close the reader, release the detector, close the sensor.
    pub fn close(self) -> SessionStats {
        let Self {
            mut sensor,
            mut reader,
            coordinator,
            ..
        } = self;
        reader.close();
        let stats = coordinator.shutdown();
        sensor.close();
        info!(frames = stats.frames, "gesture session closed");
        stats
    }
}
