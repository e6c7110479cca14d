//! Capture sessions.
//!
//! A session owns the in-flight state of one "take a photo" flow: at most
//! one composite may be pending, a retake discards whatever is pending, and
//! the temporary handle holding the guest's upload is released as soon as
//! the composite resolves or is abandoned.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::compose::{CompositeResult, ImageSource};
use crate::error::{Result, SafariError};

/// Counts live temporary source handles.
#[derive(Debug, Clone, Default)]
pub struct HandleTable {
    live: Arc<AtomicUsize>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn register(&self, source: ImageSource) -> SourceHandle {
        self.live.fetch_add(1, Ordering::SeqCst);
        SourceHandle {
            source,
            live: Arc::clone(&self.live),
        }
    }
}

/// A guest's source image, held only while its composite is pending.
///
/// Dropping the handle releases it.
#[derive(Debug)]
pub struct SourceHandle {
    source: ImageSource,
    live: Arc<AtomicUsize>,
}

impl SourceHandle {
    pub fn source(&self) -> &ImageSource {
        &self.source
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Proof that a capture was started, consumed by [`CaptureSession::finish`].
#[derive(Debug)]
pub struct CaptureTicket {
    generation: u64,
    handle: SourceHandle,
}

impl CaptureTicket {
    pub fn source(&self) -> &ImageSource {
        self.handle.source()
    }
}

/// What became of a finished capture.
#[derive(Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The composite is now the session's preview.
    Ready,
    /// The capture was discarded before it resolved; its result was dropped.
    Stale,
}

/// State of one photo capture flow.
#[derive(Debug, Default)]
pub struct CaptureSession {
    generation: u64,
    in_flight: bool,
    preview: Option<CompositeResult>,
    handles: HandleTable,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing handle table, e.g. across several sessions.
    pub fn with_handles(handles: HandleTable) -> Self {
        Self {
            handles,
            ..Self::default()
        }
    }

    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    /// Whether a new capture may be started.
    pub fn can_capture(&self) -> bool {
        !self.in_flight
    }

    pub fn preview(&self) -> Option<&CompositeResult> {
        self.preview.as_ref()
    }

    /// Start compositing `source`.
    ///
    /// Fails with [`SafariError::Busy`] while another capture is pending.
    pub fn begin(&mut self, source: ImageSource) -> Result<CaptureTicket> {
        if self.in_flight {
            return Err(SafariError::Busy);
        }
        self.in_flight = true;
        self.preview = None;

        tracing::debug!(generation = self.generation, source = %source.name(), "capture started");
        Ok(CaptureTicket {
            generation: self.generation,
            handle: self.handles.register(source),
        })
    }

    /// Discard the pending capture and the current preview.
    ///
    /// A composite that resolves later is ignored by [`CaptureSession::finish`].
    pub fn retake(&mut self) {
        self.generation += 1;
        self.in_flight = false;
        self.preview = None;
        tracing::debug!(generation = self.generation, "capture discarded");
    }

    /// Record how a capture ended.
    ///
    /// Capture is re-enabled in every case and the ticket's source handle
    /// is released. A stale ticket's outcome, success or failure, is
    /// dropped.
    pub fn finish(
        &mut self,
        ticket: CaptureTicket,
        outcome: Result<CompositeResult>,
    ) -> Result<CaptureOutcome> {
        let CaptureTicket { generation, handle } = ticket;
        drop(handle);

        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping stale capture");
            return Ok(CaptureOutcome::Stale);
        }

        self.in_flight = false;
        let result = outcome?;
        self.preview = Some(result);
        Ok(CaptureOutcome::Ready)
    }

    /// Hand the preview over for upload, resetting the session.
    pub fn take_preview(&mut self) -> Option<CompositeResult> {
        self.preview.take()
    }
}
