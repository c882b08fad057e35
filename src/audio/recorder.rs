//! Audio recorder worker
//!
//! Continuously pulls raw PCM from a capture device into a fixed-size
//! buffer and hands each filled buffer to the registered callback from a
//! dedicated background thread. Callers that register no callback poll
//! `read` themselves instead.

use crate::audio::device::{AudioBackend, AudioDevice};
use crate::audio::param::AudioParam;
use crate::audio::pts::PtsClock;
use crate::error::{MediaError, MediaResult};
use crate::worker::{Lifecycle, State, Worker};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Consumer of captured audio.
///
/// `on_data_available` borrows the capture buffer for the duration of
/// the call only; it is overwritten in place on the next loop iteration,
/// so implementations must copy anything they keep.
pub trait AudioCallback: Send + Sync {
    fn on_data_available(&self, data: &[u8]);

    fn on_data_error(&self, code: i32);
}

struct RecorderInner {
    lifecycle: Lifecycle,
    device: Option<Box<dyn AudioDevice>>,
    param: Option<AudioParam>,
    buffer_size: usize,
    pts: Option<PtsClock>,
}

/// Lifecycle-governed audio capture worker
pub struct AudioRecorderWorker {
    backend: Arc<dyn AudioBackend>,
    inner: Arc<Mutex<RecorderInner>>,
    callback: Mutex<Option<Arc<dyn AudioCallback>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl AudioRecorderWorker {
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            backend,
            inner: Arc::new(Mutex::new(RecorderInner {
                lifecycle: Lifecycle::new(),
                device: None,
                param: None,
                buffer_size: 0,
                pts: None,
            })),
            callback: Mutex::new(None),
            thread: Mutex::new(None),
        }
    }

    /// Register the capture consumer. Must happen before `start` for the
    /// background loop to run; without one the caller polls `read`.
    pub fn set_callback(&self, callback: Arc<dyn AudioCallback>) {
        *self.callback.lock() = Some(callback);
    }

    /// Timestamp converter for the configured format, once configured.
    pub fn pts(&self) -> Option<PtsClock> {
        self.inner.lock().pts
    }

    /// Derived capture buffer size, once configured.
    pub fn buffer_size_in_bytes(&self) -> Option<usize> {
        let inner = self.inner.lock();
        (inner.buffer_size > 0).then_some(inner.buffer_size)
    }

    /// Direct blocking poll for callers that run their own loop.
    ///
    /// Returns `Ok(None)` ("no data") when the worker is not running; a
    /// device failure surfaces as an error with the driver code.
    pub fn read(&self, buf: &mut [u8]) -> MediaResult<Option<usize>> {
        let mut inner = self.inner.lock();
        if !inner.lifecycle.is_running() {
            return Ok(None);
        }
        let device = inner
            .device
            .as_mut()
            .ok_or_else(|| MediaError::AudioDevice("running worker lost its device".into()))?;
        match device.read(buf) {
            Ok(read) => Ok(Some(read)),
            Err(err) => Err(MediaError::AudioRead { code: err.code }),
        }
    }

    fn join_capture_thread(&self) {
        if let Some(handle) = self.thread.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Worker for AudioRecorderWorker {
    type Param = AudioParam;

    fn configure(&self, param: AudioParam) -> MediaResult<()> {
        let mut inner = self.inner.lock();
        inner.lifecycle.expect("configure", &[State::Uninitialized])?;
        // Buffer size is derived from the backend, never set directly.
        let buffer_size = self.backend.min_buffer_size(&param)?;
        let device = self.backend.open(&param, buffer_size)?;
        tracing::info!(
            sample_rate = param.sample_rate_hz,
            channels = param.channel_layout.count(),
            buffer_size,
            "audio recorder configured"
        );
        inner.pts = Some(PtsClock::new(&param, buffer_size));
        inner.buffer_size = buffer_size;
        inner.device = Some(device);
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
        let buffer_size = inner.buffer_size;
        let device = inner
            .device
            .as_mut()
            .ok_or_else(|| MediaError::AudioDevice("configured worker lost its device".into()))?;
        device.start()?;
        inner.lifecycle.transition(State::Running);
        drop(inner);

        let Some(callback) = self.callback.lock().clone() else {
            // Poll mode: the caller drives read() itself.
            return Ok(());
        };
        let inner = Arc::clone(&self.inner);
        let handle = std::thread::spawn(move || capture_loop(inner, callback, buffer_size));
        *self.thread.lock() = Some(handle);
        tracing::info!("audio capture loop started");
        Ok(())
    }

    fn stop(&self) -> MediaResult<()> {
        let mut inner = self.inner.lock();
        if inner.lifecycle.current() == State::Stopped {
            return Ok(());
        }
        inner.lifecycle.expect("stop", &[State::Running])?;
        // Leave running first so the loop exits on its next check.
        inner.lifecycle.transition(State::Stopped);
        if let Some(device) = inner.device.as_mut() {
            device.stop()?;
        }
        drop(inner);
        self.join_capture_thread();
        tracing::info!("audio recorder stopped");
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
        // Dropping the device frees the hardware handle.
        inner.device = None;
        inner.param = None;
        inner.lifecycle.transition(State::Released);
        drop(inner);
        self.join_capture_thread();
        tracing::info!("audio recorder released");
        Ok(())
    }

    fn state(&self) -> State {
        self.inner.lock().lifecycle.current()
    }
}

/// Background pull loop. One blocking read per iteration; a failed read
/// is reported and the loop keeps going.
fn capture_loop(
    inner: Arc<Mutex<RecorderInner>>,
    callback: Arc<dyn AudioCallback>,
    buffer_size: usize,
) {
    let mut buf = vec![0u8; buffer_size];
    loop {
        let read = {
            let mut inner = inner.lock();
            if !inner.lifecycle.is_running() {
                break;
            }
            let Some(device) = inner.device.as_mut() else {
                break;
            };
            device.read(&mut buf)
        };
        match read {
            Ok(read) => callback.on_data_available(&buf[..read]),
            Err(err) => {
                tracing::warn!(code = err.code, "audio read failed");
                callback.on_data_error(err.code);
            }
        }
    }
    tracing::debug!("audio capture loop exited");
}
