//! `gesture_core` — Active-body gesture coordination.
//!
//! # Module layout
//! - [`types`]       — Tracking ids, body records, fixed-capacity body frames
//! - [`ingest`]      — Copies leased sensor frames into [`BodyFrame`]s
//! - [`selector`]    — Active body selection (stability + first-match)
//! - [`detector`]    — Gesture detector boundary and detector reports
//! - [`binding`]     — Detector binding and pause/resume decisions
//! - [`result`]      — Observable gesture result with per-field notifications
//! - [`coordinator`] — Single owner of selection, binding and result state
//! - [`runtime`]     — Coordinator actor thread fed by a command queue
//! - [`session`]     — Ordered acquire / teardown of sensor, reader, detector
//! - [`metrics`]     — Session statistics

pub mod binding;
pub mod coordinator;
pub mod detector;
pub mod ingest;
pub mod metrics;
pub mod result;
pub mod runtime;
pub mod selector;
pub mod session;
pub mod types;

pub use binding::{BindOutcome, TrackingBinding};
pub use coordinator::{
    Coordinator, CoordinatorConfig, CoordinatorEvent, CoordinatorSnapshot, ReportOutcome,
    TickOutput,
};
pub use detector::{DetectorCall, DetectorReport, GestureDetector, RecordingDetector};
pub use ingest::{FrameIngestor, IngestError};
pub use metrics::SessionStats;
pub use result::{
    FieldChange, FieldValue, GestureResult, ResultField, ResultStateStore, SubscriptionId,
};
pub use runtime::{spawn_coordinator, CoordinatorHandle, EventSender, RuntimeConfig, RuntimeError};
pub use selector::{first_eligible, select_active};
pub use session::{Session, SessionError, Tick};
pub use types::{ActiveIndex, BodyFrame, BodyRecord, HandState, TrackingId};
