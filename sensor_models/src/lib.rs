//! `sensor_models` — Skeletal tracking sensor boundary: raw body records,
//! sensor parameters and availability, scoped frame buffers.

pub mod body;
pub mod frame;
pub mod sensor;

pub use body::{HandState, RawBody};
pub use frame::{BodyFrameSource, FrameBuffer, FrameLease};
pub use sensor::{Sensor, SensorError, SensorParams, SensorStatus, MAX_BODIES};
