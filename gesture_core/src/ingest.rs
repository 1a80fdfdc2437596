//! Frame ingestion: copy a leased sensor frame into a [`BodyFrame`] and
//! release the lease before anything else runs.

use crate::types::{BodyFrame, BodyRecord};
use sensor_models::{BodyFrameSource, FrameLease};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("frame carries {got} bodies but the sensor declares {capacity} slots")]
    CapacityExceeded { got: usize, capacity: usize },
}

/// Normalises sensor frames into fixed-capacity body frames.
#[derive(Clone, Debug)]
pub struct FrameIngestor {
    capacity: usize,
}

impl FrameIngestor {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy the leased bodies out. The lease is consumed, so its buffer is
    /// released when this returns regardless of the outcome.
    pub fn ingest(
        &self,
        lease: Option<FrameLease<'_>>,
    ) -> Result<Option<BodyFrame>, IngestError> {
        let Some(lease) = lease else {
            return Ok(None);
        };
        let records: Vec<BodyRecord> = lease.bodies().iter().map(BodyRecord::from).collect();
        drop(lease);
        BodyFrame::from_records(records, self.capacity).map(Some)
    }

    /// Acquire and ingest the next frame of `source`, if one is ready.
    pub fn poll(
        &self,
        source: &mut dyn BodyFrameSource,
    ) -> Result<Option<BodyFrame>, IngestError> {
        self.ingest(source.acquire_frame())
    }
}
