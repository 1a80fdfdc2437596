//! Sensor parameters, availability status and the sensor lifecycle trait.

use crate::frame::BodyFrameSource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of bodies the sensor tracks simultaneously.
pub const MAX_BODIES: usize = 6;

/// Physical configuration of a skeletal tracking sensor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SensorParams {
    /// Number of body slots in every frame
    pub max_bodies: usize,
    /// Body frame rate (Hz)
    pub frame_rate_hz: f64,
    /// Closest distance at which a body can be tracked (meters)
    pub min_range: f64,
    /// Farthest distance at which a body can be tracked (meters)
    pub max_range: f64,
    /// Horizontal field of view half-angle (radians)
    pub fov_half: f64,
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            max_bodies: MAX_BODIES,
            frame_rate_hz: 30.0,
            min_range: 0.5,
            max_range: 4.5,
            fov_half: 35.0_f64.to_radians(), // 70° horizontal
        }
    }
}

/// Availability of the sensor as seen by the application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorStatus {
    /// Sensor open and delivering frames
    #[default]
    Running,
    /// Sensor known but paused, closed or unplugged
    NotAvailable,
    /// No sensor present at all
    NoSensor,
}

impl SensorStatus {
    pub fn is_available(self) -> bool {
        self == SensorStatus::Running
    }

    /// Human-readable status line for display.
    pub fn label(self) -> &'static str {
        match self {
            SensorStatus::Running => "Running",
            SensorStatus::NotAvailable => "Sensor not available",
            SensorStatus::NoSensor => "No ready sensor found",
        }
    }
}

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("no sensor connected")]
    NotConnected,
    #[error("failed to open sensor: {reason}")]
    Open { reason: String },
    #[error("sensor is closed")]
    Closed,
}

/// A skeletal tracking sensor.
///
/// Acquisition order is `open` → `open_body_reader`; teardown closes every
/// reader before `close`.
pub trait Sensor: Send {
    fn params(&self) -> &SensorParams;
    fn open(&mut self) -> Result<(), SensorError>;
    fn status(&self) -> SensorStatus;
    fn open_body_reader(&mut self) -> Result<Box<dyn BodyFrameSource>, SensorError>;
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_track_six_bodies() {
        let params = SensorParams::default();
        assert_eq!(params.max_bodies, MAX_BODIES);
        assert!(params.min_range < params.max_range);
    }

    #[test]
    fn only_running_is_available() {
        assert!(SensorStatus::Running.is_available());
        assert!(!SensorStatus::NotAvailable.is_available());
        assert!(!SensorStatus::NoSensor.is_available());
    }
}
