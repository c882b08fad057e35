//! Callback drain engine
//!
//! Driver-pushed notifications arrive on whatever thread the session
//! owns. Every handler body re-checks the lifecycle under the worker
//! mutex before touching the session, since `stop()` and `release()`
//! race these callbacks from the controlling thread.

use crate::codec::format::FormatDescriptor;
use crate::codec::polling;
use crate::codec::session::{BufferInfo, CodecRuntimeError, SessionEventHandler};
use crate::codec::worker::{EncoderInner, ReadOutcome, VideoCallback};
use crate::worker::State;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Bridges session notifications back into the worker.
///
/// Holds only a weak reference so a released worker (and its session,
/// which owns this handler) unwinds without a reference cycle.
pub(crate) struct WorkerEventHandler {
    inner: Weak<Mutex<EncoderInner>>,
    callback: Arc<Mutex<Option<Arc<dyn VideoCallback>>>>,
}

impl WorkerEventHandler {
    pub(crate) fn new(
        inner: Weak<Mutex<EncoderInner>>,
        callback: Arc<Mutex<Option<Arc<dyn VideoCallback>>>>,
    ) -> Self {
        Self { inner, callback }
    }

    fn consumer(&self) -> Option<Arc<dyn VideoCallback>> {
        self.callback.lock().clone()
    }
}

impl SessionEventHandler for WorkerEventHandler {
    fn on_input_buffer_available(&self, index: usize) {
        // Surface-input encoders feed through the capture surface; the
        // index is informational only.
        tracing::trace!(index, "input buffer available");
    }

    fn on_output_buffer_available(&self, index: usize, info: BufferInfo) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let callback = self.consumer();
        let mut inner = inner.lock();
        if !inner.lifecycle.is_running() {
            // Late notification after stop/release; the slot is no
            // longer ours to touch.
            tracing::debug!(index, "dropping output notification while not running");
            return;
        }
        let Some(session) = inner.session.as_mut() else {
            return;
        };
        match polling::deliver_output(session.as_mut(), index, info, callback.as_deref()) {
            Ok(ReadOutcome::EndOfStream) => tracing::debug!("end of stream delivered"),
            Ok(_) => {}
            Err(err) => tracing::error!(%err, index, "output drain failed"),
        }
    }

    fn on_error(&self, error: CodecRuntimeError) {
        tracing::error!(
            recoverable = error.recoverable,
            "codec runtime error: {}",
            error.message
        );
        if let Some(cb) = self.consumer() {
            cb.on_error(&error);
        }
        if error.recoverable {
            return;
        }
        // Fatal errors force the worker to stopped.
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut inner = inner.lock();
        if !inner.lifecycle.is_running() {
            return;
        }
        if let Some(session) = inner.session.as_mut() {
            if let Err(err) = session.stop() {
                tracing::warn!(%err, "stopping session after fatal error failed");
            }
        }
        inner.lifecycle.transition(State::Stopped);
    }

    fn on_output_format_changed(&self, format: FormatDescriptor) {
        tracing::debug!("encoder output format changed");
        if let Some(cb) = self.consumer() {
            cb.on_output_format_changed(&format);
        }
    }
}
