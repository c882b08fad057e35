//! Scripted mock collaborators for worker and service tests.
//!
//! Every mock journals the hardware commands it receives so tests can
//! assert exactly-once allocation, start/stop pairing and slot-release
//! discipline.

use crate::audio::device::{AudioBackend, AudioDevice, ReadError};
use crate::audio::param::{AudioParam, AudioSource, ChannelLayout, SampleFormat};
use crate::capture::display::{VirtualDisplay, VirtualDisplaySource};
use crate::capture::surface::CaptureSurface;
use crate::codec::format::{FormatDescriptor, MIMETYPE_VIDEO_AVC};
use crate::codec::param::{VideoParam, COLOR_FORMAT_SURFACE};
use crate::codec::session::{
    BufferInfo, CodecBackend, CodecRuntimeError, CodecSession, DequeueEvent, SessionEventHandler,
};
use crate::codec::worker::VideoCallback;
use crate::error::{MediaError, MediaResult};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub(crate) fn test_video_param() -> VideoParam {
    VideoParam::new(
        MIMETYPE_VIDEO_AVC,
        1920,
        1080,
        8 * 1024 * 1024,
        COLOR_FORMAT_SURFACE,
        30,
        1,
    )
    .unwrap()
}

pub(crate) fn test_audio_param() -> AudioParam {
    AudioParam::new(
        AudioSource::Microphone,
        44100,
        ChannelLayout::Stereo,
        SampleFormat::Pcm16,
    )
    .unwrap()
}

/// Journal of every command a mock codec session received
#[derive(Default)]
pub(crate) struct SessionLog {
    configures: AtomicUsize,
    starts: AtomicUsize,
    stops: AtomicUsize,
    session_drops: AtomicUsize,
    released_slots: Mutex<Vec<usize>>,
}

impl SessionLog {
    pub fn configures(&self) -> usize {
        self.configures.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn session_drops(&self) -> usize {
        self.session_drops.load(Ordering::SeqCst)
    }

    pub fn released_slots(&self) -> Vec<usize> {
        self.released_slots.lock().clone()
    }
}

type HandlerSlot = Arc<Mutex<Option<Box<dyn SessionEventHandler>>>>;

/// Scripted codec backend handing out at most one mock session at a time
pub(crate) struct MockCodecBackend {
    log: Arc<SessionLog>,
    events: Arc<Mutex<VecDeque<DequeueEvent>>>,
    buffers: Arc<Mutex<HashMap<usize, Vec<u8>>>>,
    handler: HandlerSlot,
    created: AtomicUsize,
    fail_create: bool,
}

impl MockCodecBackend {
    pub fn new() -> Self {
        Self {
            log: Arc::new(SessionLog::default()),
            events: Arc::new(Mutex::new(VecDeque::new())),
            buffers: Arc::new(Mutex::new(HashMap::new())),
            handler: Arc::new(Mutex::new(None)),
            created: AtomicUsize::new(0),
            fail_create: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::new()
        }
    }

    pub fn log(&self) -> Arc<SessionLog> {
        self.log.clone()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Queue a dequeue event for the polling path.
    pub fn push_event(&self, event: DequeueEvent) {
        self.events.lock().push_back(event);
    }

    /// Stage encoded bytes behind a slot index.
    pub fn set_buffer(&self, index: usize, bytes: Vec<u8>) {
        self.buffers.lock().insert(index, bytes);
    }

    pub fn has_event_handler(&self) -> bool {
        self.handler.lock().is_some()
    }

    /// Invoke the registered handler the way a driver thread would.
    pub fn fire_output(&self, index: usize, info: BufferInfo) {
        if let Some(handler) = self.handler.lock().as_ref() {
            handler.on_output_buffer_available(index, info);
        }
    }

    pub fn fire_error(&self, error: CodecRuntimeError) {
        if let Some(handler) = self.handler.lock().as_ref() {
            handler.on_error(error);
        }
    }

    pub fn fire_format_changed(&self, format: FormatDescriptor) {
        if let Some(handler) = self.handler.lock().as_ref() {
            handler.on_output_format_changed(format);
        }
    }
}

impl CodecBackend for MockCodecBackend {
    fn create_encoder(&self, mime: &str) -> MediaResult<Box<dyn CodecSession>> {
        if self.fail_create {
            return Err(MediaError::SessionCreation(format!(
                "no encoder for {mime}"
            )));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            log: self.log.clone(),
            events: self.events.clone(),
            buffers: self.buffers.clone(),
            handler: self.handler.clone(),
        }))
    }
}

/// Surface stand-in the mock display source knows how to unwrap
pub(crate) struct MockSurface {
    pub token: u32,
}

struct MockSession {
    log: Arc<SessionLog>,
    events: Arc<Mutex<VecDeque<DequeueEvent>>>,
    buffers: Arc<Mutex<HashMap<usize, Vec<u8>>>>,
    handler: HandlerSlot,
}

impl CodecSession for MockSession {
    fn configure(&mut self, _format: &FormatDescriptor, _flags: u32) -> MediaResult<()> {
        self.log.configures.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn create_input_surface(&mut self) -> MediaResult<CaptureSurface> {
        Ok(CaptureSurface::new(MockSurface { token: 42 }))
    }

    fn start(&mut self) -> MediaResult<()> {
        self.log.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> MediaResult<()> {
        self.log.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn dequeue_output(&mut self, timeout: Duration) -> MediaResult<DequeueEvent> {
        if let Some(event) = self.events.lock().pop_front() {
            return Ok(event);
        }
        // nothing queued: behave like hardware with no output ready
        std::thread::sleep(timeout);
        Ok(DequeueEvent::TimedOut)
    }

    fn output_buffer(&mut self, index: usize) -> MediaResult<Vec<u8>> {
        self.buffers
            .lock()
            .get(&index)
            .cloned()
            .ok_or_else(|| MediaError::Codec(format!("no buffer staged at index {index}")))
    }

    fn release_output_buffer(&mut self, index: usize, _render: bool) -> MediaResult<()> {
        self.log.released_slots.lock().push(index);
        Ok(())
    }

    fn set_event_handler(&mut self, handler: Box<dyn SessionEventHandler>) -> MediaResult<()> {
        *self.handler.lock() = Some(handler);
        Ok(())
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.log.session_drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Journal of every command a mock audio device received
#[derive(Default)]
pub(crate) struct AudioLog {
    starts: AtomicUsize,
    stops: AtomicUsize,
    device_drops: AtomicUsize,
}

impl AudioLog {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn device_drops(&self) -> usize {
        self.device_drops.load(Ordering::SeqCst)
    }
}

/// Scripted audio backend; unscripted reads fill the whole buffer
pub(crate) struct MockAudioBackend {
    log: Arc<AudioLog>,
    script: Arc<Mutex<VecDeque<Result<usize, ReadError>>>>,
    min_buffer_size: usize,
    created: AtomicUsize,
    fail_open: bool,
}

impl MockAudioBackend {
    pub fn new(min_buffer_size: usize) -> Self {
        Self {
            log: Arc::new(AudioLog::default()),
            script: Arc::new(Mutex::new(VecDeque::new())),
            min_buffer_size,
            created: AtomicUsize::new(0),
            fail_open: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::new(64)
        }
    }

    pub fn log(&self) -> Arc<AudioLog> {
        self.log.clone()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Queue one read result ahead of the default full-buffer reads.
    pub fn script_read(&self, result: Result<usize, ReadError>) {
        self.script.lock().push_back(result);
    }
}

impl AudioBackend for MockAudioBackend {
    fn min_buffer_size(&self, _param: &AudioParam) -> MediaResult<usize> {
        Ok(self.min_buffer_size)
    }

    fn open(
        &self,
        _param: &AudioParam,
        _buffer_size_in_bytes: usize,
    ) -> MediaResult<Box<dyn AudioDevice>> {
        if self.fail_open {
            return Err(MediaError::AudioDevice("capture device busy".into()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockAudioDevice {
            log: self.log.clone(),
            script: self.script.clone(),
        }))
    }
}

struct MockAudioDevice {
    log: Arc<AudioLog>,
    script: Arc<Mutex<VecDeque<Result<usize, ReadError>>>>,
}

impl AudioDevice for MockAudioDevice {
    fn start(&mut self) -> MediaResult<()> {
        self.log.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> MediaResult<()> {
        self.log.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        // keep the loop from spinning hot in tests
        std::thread::sleep(Duration::from_millis(1));
        let scripted = self.script.lock().pop_front();
        match scripted {
            Some(Ok(read)) => {
                let read = read.min(buf.len());
                buf[..read].fill(0xAB);
                Ok(read)
            }
            Some(Err(err)) => Err(err),
            None => {
                buf.fill(0xAB);
                Ok(buf.len())
            }
        }
    }
}

impl Drop for MockAudioDevice {
    fn drop(&mut self) {
        self.log.device_drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Display source that unwraps the mock surface and counts hand-offs
pub(crate) struct MockDisplaySource {
    created: AtomicUsize,
    released: Arc<AtomicUsize>,
}

impl MockDisplaySource {
    pub fn new() -> Self {
        Self {
            created: AtomicUsize::new(0),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl VirtualDisplaySource for MockDisplaySource {
    fn create_display(
        &self,
        _name: &str,
        _width: u32,
        _height: u32,
        surface: CaptureSurface,
    ) -> MediaResult<Box<dyn VirtualDisplay>> {
        // the opaque hand-off must round-trip to the platform type
        let surface = surface
            .downcast::<MockSurface>()
            .map_err(|_| MediaError::Display("foreign surface type".into()))?;
        assert_eq!(surface.token, 42);
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockDisplay {
            released: self.released.clone(),
            done: AtomicBool::new(false),
        }))
    }
}

struct MockDisplay {
    released: Arc<AtomicUsize>,
    done: AtomicBool,
}

impl VirtualDisplay for MockDisplay {
    fn release(&mut self) {
        if !self.done.swap(true, Ordering::SeqCst) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Video consumer that records everything it was handed
#[derive(Default)]
pub(crate) struct RecordingVideoCallback {
    pub payloads: Mutex<Vec<Vec<u8>>>,
    pub errors: Mutex<Vec<CodecRuntimeError>>,
    format_changes: AtomicUsize,
}

impl RecordingVideoCallback {
    pub fn format_changes(&self) -> usize {
        self.format_changes.load(Ordering::SeqCst)
    }
}

impl VideoCallback for RecordingVideoCallback {
    fn on_output_format_changed(&self, _format: &FormatDescriptor) {
        self.format_changes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_output_available(&self, data: &[u8]) {
        self.payloads.lock().push(data.to_vec());
    }

    fn on_error(&self, error: &CodecRuntimeError) {
        self.errors.lock().push(error.clone());
    }
}

/// Audio consumer that records everything it was handed
#[derive(Default)]
pub(crate) struct RecordingAudioCallback {
    pub chunks: Mutex<Vec<Vec<u8>>>,
    pub errors: Mutex<Vec<i32>>,
}

impl crate::audio::recorder::AudioCallback for RecordingAudioCallback {
    fn on_data_available(&self, data: &[u8]) {
        self.chunks.lock().push(data.to_vec());
    }

    fn on_data_error(&self, code: i32) {
        self.errors.lock().push(code);
    }
}
