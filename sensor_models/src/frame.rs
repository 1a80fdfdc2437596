//! Scoped body frame buffers.
//!
//! A reader owns one [`FrameBuffer`] and hands out a [`FrameLease`] per
//! acquired frame. The lease mutably borrows the buffer, so the reader cannot
//! acquire again (and the consumer cannot keep the bodies) until the lease is
//! dropped; dropping it releases the frame.

use crate::body::RawBody;

/// Reusable storage for the most recent body frame of a reader.
#[derive(Clone, Debug, Default)]
pub struct FrameBuffer {
    bodies: Vec<RawBody>,
    relative_time_ms: u64,
    acquired: u64,
    released: u64,
}

impl FrameBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bodies: Vec::with_capacity(capacity),
            ..Default::default()
        }
    }

    /// Overwrite the buffer with a new frame.
    pub fn fill<I>(&mut self, bodies: I, relative_time_ms: u64)
    where
        I: IntoIterator<Item = RawBody>,
    {
        self.bodies.clear();
        self.bodies.extend(bodies);
        self.relative_time_ms = relative_time_ms;
    }

    /// Lease the current contents for the duration of one frame callback.
    pub fn lease(&mut self) -> FrameLease<'_> {
        self.acquired += 1;
        FrameLease { buffer: self }
    }

    /// Number of leases handed out and not yet released.
    pub fn outstanding(&self) -> u64 {
        self.acquired - self.released
    }
}

/// Borrowed access to one acquired frame. Released on drop.
#[derive(Debug)]
pub struct FrameLease<'a> {
    buffer: &'a mut FrameBuffer,
}

impl FrameLease<'_> {
    pub fn bodies(&self) -> &[RawBody] {
        &self.buffer.bodies
    }

    pub fn relative_time_ms(&self) -> u64 {
        self.buffer.relative_time_ms
    }
}

impl Drop for FrameLease<'_> {
    fn drop(&mut self) {
        self.buffer.released += 1;
    }
}

/// A reader delivering body frames from an open sensor.
pub trait BodyFrameSource: Send {
    /// Acquire the next frame, if one is ready. `None` is a normal tick.
    fn acquire_frame(&mut self) -> Option<FrameLease<'_>>;

    /// Stop frame delivery and release the reader's resources.
    fn close(&mut self);
}
