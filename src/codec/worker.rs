//! Video encode worker
//!
//! One worker owns one hardware encoder session and drives it through
//! the lifecycle state machine. Output draining comes in two flavours
//! selected at construction: a caller-driven polling loop and
//! driver-pushed callbacks. Both share the same classification and
//! slot-release discipline.

use crate::capture::surface::CaptureSurface;
use crate::codec::callback::WorkerEventHandler;
use crate::codec::format::FormatDescriptor;
use crate::codec::param::VideoParam;
use crate::codec::polling;
use crate::codec::session::{
    CodecBackend, CodecRuntimeError, CodecSession, CONFIGURE_FLAG_ENCODE,
};
use crate::error::{MediaError, MediaResult};
use crate::worker::{Lifecycle, State, Worker};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// How encoded output leaves the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode")]
pub enum DrainMode {
    /// The owner polls [`VideoEncodeWorker::poll_once`] from a dedicated
    /// thread while the worker is running.
    Polling { poll_timeout: Duration },
    /// The driver pushes output notifications from its internal threads.
    Callback,
}

/// Outcome of one polling drain step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Payload bytes were handed to the consumer callback
    Delivered { bytes: usize },
    /// Nothing usable this round: timeout or a suppressed metadata unit
    NoData,
    /// The session signalled end of stream
    EndOfStream,
    /// The worker is not running; polling loops should exit
    NotRunning,
}

/// Consumer of encoded video output.
///
/// Payload slices are borrowed for the duration of the call only; the
/// backing slot goes back to the session as soon as the callback
/// returns, so implementations must copy anything they keep. Callbacks
/// run with the worker serialized and must not call back into it.
pub trait VideoCallback: Send + Sync {
    fn on_output_format_changed(&self, _format: &FormatDescriptor) {}

    fn on_output_available(&self, data: &[u8]);

    fn on_error(&self, _error: &CodecRuntimeError) {}
}

pub(crate) struct EncoderInner {
    pub(crate) lifecycle: Lifecycle,
    pub(crate) session: Option<Box<dyn CodecSession>>,
    pub(crate) param: Option<VideoParam>,
}

type SharedCallback = Arc<Mutex<Option<Arc<dyn VideoCallback>>>>;

/// Lifecycle-governed hardware video encoder.
///
/// State mutation and session commands share one mutex, so a drain in
/// progress on one thread and a stop/release on another serialize; a
/// stopping worker is observed within one poll timeout.
pub struct VideoEncodeWorker {
    mode: DrainMode,
    backend: Arc<dyn CodecBackend>,
    pub(crate) inner: Arc<Mutex<EncoderInner>>,
    pub(crate) callback: SharedCallback,
}

impl VideoEncodeWorker {
    pub fn new(backend: Arc<dyn CodecBackend>, mode: DrainMode) -> Self {
        Self {
            mode,
            backend,
            inner: Arc::new(Mutex::new(EncoderInner {
                lifecycle: Lifecycle::new(),
                session: None,
                param: None,
            })),
            callback: Arc::new(Mutex::new(None)),
        }
    }

    pub fn drain_mode(&self) -> DrainMode {
        self.mode
    }

    /// Register the consumer of encoded output. May be swapped at any
    /// time; the next drained unit goes to the new consumer.
    pub fn set_callback(&self, callback: Arc<dyn VideoCallback>) {
        *self.callback.lock() = Some(callback);
    }

    /// Writable surface for the screen-capture service. Only available
    /// while configured, before the session starts.
    pub fn input_surface(&self) -> MediaResult<CaptureSurface> {
        let mut inner = self.inner.lock();
        inner.lifecycle.expect("input_surface", &[State::Configured])?;
        let session = inner
            .session
            .as_mut()
            .ok_or_else(|| MediaError::Codec("configured worker lost its session".into()))?;
        session.create_input_surface()
    }

    /// One bounded drain step. Polling mode only; the owning loop should
    /// run this on a dedicated thread while the outcome is not
    /// [`ReadOutcome::NotRunning`].
    pub fn poll_once(&self) -> MediaResult<ReadOutcome> {
        let DrainMode::Polling { poll_timeout } = self.mode else {
            return Err(MediaError::WrongDrainMode("poll_once"));
        };
        let callback = self.callback.lock().clone();
        let mut inner = self.inner.lock();
        if !inner.lifecycle.is_running() {
            return Ok(ReadOutcome::NotRunning);
        }
        polling::drain_step(&mut inner, poll_timeout, callback.as_deref())
    }
}

impl Worker for VideoEncodeWorker {
    type Param = VideoParam;

    fn configure(&self, param: VideoParam) -> MediaResult<()> {
        let mut inner = self.inner.lock();
        inner.lifecycle.expect("configure", &[State::Uninitialized])?;
        // A creation failure propagates and leaves the worker
        // uninitialized.
        let mut session = self.backend.create_encoder(&param.mime)?;
        if let DrainMode::Callback = self.mode {
            let handler =
                WorkerEventHandler::new(Arc::downgrade(&self.inner), self.callback.clone());
            session.set_event_handler(Box::new(handler))?;
        }
        session.configure(&param.to_format(), CONFIGURE_FLAG_ENCODE)?;
        tracing::info!(
            mime = %param.mime,
            width = param.width,
            height = param.height,
            "video encoder configured"
        );
        inner.session = Some(session);
        inner.param = Some(param);
        inner.lifecycle.transition(State::Configured);
        Ok(())
    }

    fn start(&self) -> MediaResult<()> {
        let mut inner = self.inner.lock();
        if inner.lifecycle.is_running() {
            return Ok(());
        }
        inner
            .lifecycle
            .expect("start", &[State::Configured, State::Stopped])?;
        let resuming = inner.lifecycle.current() == State::Stopped;
        let EncoderInner {
            lifecycle,
            session,
            param,
        } = &mut *inner;
        let session = session
            .as_mut()
            .ok_or_else(|| MediaError::Codec("configured worker lost its session".into()))?;
        if resuming {
            // Restart re-applies the stored configuration.
            let format = param
                .as_ref()
                .map(VideoParam::to_format)
                .ok_or_else(|| MediaError::Codec("stopped worker lost its param".into()))?;
            session.configure(&format, CONFIGURE_FLAG_ENCODE)?;
        }
        session.start()?;
        lifecycle.transition(State::Running);
        tracing::info!(resuming, "video encoder started");
        Ok(())
    }

    fn stop(&self) -> MediaResult<()> {
        let mut inner = self.inner.lock();
        if inner.lifecycle.current() == State::Stopped {
            return Ok(());
        }
        inner.lifecycle.expect("stop", &[State::Running])?;
        if let Some(session) = inner.session.as_mut() {
            session.stop()?;
        }
        inner.lifecycle.transition(State::Stopped);
        tracing::info!("video encoder stopped");
        Ok(())
    }

    fn release(&self) -> MediaResult<()> {
        let mut inner = self.inner.lock();
        if inner.lifecycle.current() == State::Released {
            return Ok(());
        }
        inner.lifecycle.expect(
            "release",
            &[State::Configured, State::Running, State::Stopped],
        )?;
        // Dropping the session frees the hardware handle.
        inner.session = None;
        inner.param = None;
        inner.lifecycle.transition(State::Released);
        tracing::info!("video encoder released");
        Ok(())
    }

    fn state(&self) -> State {
        self.inner.lock().lifecycle.current()
    }
}
