//! Simulated sensor and body reader over a shared [`SimWorld`].

use crate::world::SimWorld;
use sensor_models::{
    BodyFrameSource, FrameBuffer, FrameLease, Sensor, SensorError, SensorParams, SensorStatus,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

pub type SharedWorld = Arc<Mutex<SimWorld>>;

pub(crate) fn lock(world: &SharedWorld) -> MutexGuard<'_, SimWorld> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SimSensor {
    world: SharedWorld,
    params: SensorParams,
    connected: bool,
    open: bool,
}

impl SimSensor {
    pub fn new(world: SharedWorld) -> Self {
        let params = lock(&world).params().clone();
        Self {
            world,
            params,
            connected: true,
            open: false,
        }
    }

    /// A sensor with nothing plugged in; `open` fails.
    pub fn disconnected(world: SharedWorld) -> Self {
        Self {
            connected: false,
            ..Self::new(world)
        }
    }
}

impl Sensor for SimSensor {
    fn params(&self) -> &SensorParams {
        &self.params
    }

    fn open(&mut self) -> Result<(), SensorError> {
        if !self.connected {
            return Err(SensorError::NotConnected);
        }
        self.open = true;
        info!(max_bodies = self.params.max_bodies, "simulated sensor opened");
        Ok(())
    }

    fn status(&self) -> SensorStatus {
        if !self.connected {
            SensorStatus::NoSensor
        } else if !self.open {
            SensorStatus::NotAvailable
        } else {
            lock(&self.world).status()
        }
    }

    fn open_body_reader(&mut self) -> Result<Box<dyn BodyFrameSource>, SensorError> {
        if !self.open {
            return Err(SensorError::Closed);
        }
        Ok(Box::new(SimBodyReader {
            world: self.world.clone(),
            buffer: FrameBuffer::with_capacity(self.params.max_bodies),
            last_seq: lock(&self.world).frame_seq(),
            closed: false,
        }))
    }

    fn close(&mut self) {
        if std::mem::take(&mut self.open) {
            info!("simulated sensor closed");
        }
    }
}

/// Delivers each world frame at most once.
pub struct SimBodyReader {
    world: SharedWorld,
    buffer: FrameBuffer,
    last_seq: u64,
    closed: bool,
}

impl BodyFrameSource for SimBodyReader {
    fn acquire_frame(&mut self) -> Option<FrameLease<'_>> {
        if self.closed {
            return None;
        }
        let (bodies, time_ms) = {
            let world = lock(&self.world);
            if world.is_unplugged() || world.frame_seq() == self.last_seq {
                return None;
            }
            self.last_seq = world.frame_seq();
            (world.raw_bodies(), (world.time() * 1000.0).round() as u64)
        };
        self.buffer.fill(bodies, time_ms);
        Some(self.buffer.lease())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
