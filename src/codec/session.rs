//! Hardware codec session contract
//!
//! The session is a black box owned by the platform backend: raw frames
//! go in through the input surface, encoded units come out through
//! bounded polls or driver-pushed notifications. The pipeline core only
//! drives the lifecycle and the drain protocol.

use crate::capture::surface::CaptureSurface;
use crate::codec::format::FormatDescriptor;
use crate::error::MediaResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configure the session as an encoder.
pub const CONFIGURE_FLAG_ENCODE: u32 = 1;

/// Output unit carries a key frame.
pub const BUFFER_FLAG_KEY_FRAME: u32 = 1;
/// Output unit is codec configuration metadata, not payload.
pub const BUFFER_FLAG_CODEC_CONFIG: u32 = 2;
/// Output unit marks the end of the stream.
pub const BUFFER_FLAG_END_OF_STREAM: u32 = 4;

/// Per-output-unit record produced on each drain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferInfo {
    pub offset: usize,
    pub size: usize,
    /// Presentation timestamp in microseconds
    pub pts_us: i64,
    pub flags: u32,
}

impl BufferInfo {
    pub fn is_key_frame(&self) -> bool {
        self.flags & BUFFER_FLAG_KEY_FRAME != 0
    }

    pub fn is_codec_config(&self) -> bool {
        self.flags & BUFFER_FLAG_CODEC_CONFIG != 0
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.flags & BUFFER_FLAG_END_OF_STREAM != 0
    }
}

/// Result of one bounded output poll
#[derive(Debug, Clone)]
pub enum DequeueEvent {
    /// Nothing became available within the timeout
    TimedOut,
    /// The session renegotiated its output format
    FormatChanged(FormatDescriptor),
    /// An output unit is ready at `index`
    OutputAvailable { index: usize, info: BufferInfo },
}

/// Runtime error reported by a session while encoding
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CodecRuntimeError {
    pub message: String,
    /// Recoverable errors leave the session usable; fatal ones force the
    /// worker to stop.
    pub recoverable: bool,
}

/// Notifications pushed by a callback-mode session.
///
/// The driver invokes these from its own internal threads; no assumption
/// about the calling thread is valid, and any of them may race `stop()`
/// or `release()` on the controlling thread.
pub trait SessionEventHandler: Send + Sync {
    fn on_input_buffer_available(&self, index: usize);

    fn on_output_buffer_available(&self, index: usize, info: BufferInfo);

    fn on_error(&self, error: CodecRuntimeError);

    fn on_output_format_changed(&self, format: FormatDescriptor);
}

/// Opaque driver-level encoder instance.
///
/// Dropping the box releases the underlying hardware handle.
pub trait CodecSession: Send {
    fn configure(&mut self, format: &FormatDescriptor, flags: u32) -> MediaResult<()>;

    /// Writable input surface for surface-input encoders.
    fn create_input_surface(&mut self) -> MediaResult<CaptureSurface>;

    fn start(&mut self) -> MediaResult<()>;

    fn stop(&mut self) -> MediaResult<()>;

    /// Bounded poll for the next output event.
    fn dequeue_output(&mut self, timeout: Duration) -> MediaResult<DequeueEvent>;

    /// Copy of the encoded bytes at `index`. The slot stays owned by the
    /// session until [`release_output_buffer`] returns it.
    ///
    /// [`release_output_buffer`]: CodecSession::release_output_buffer
    fn output_buffer(&mut self, index: usize) -> MediaResult<Vec<u8>>;

    /// Return the slot at `index` to the session. Must be called exactly
    /// once per dequeued index; a missed release leaks the slot and
    /// eventually stalls the session.
    fn release_output_buffer(&mut self, index: usize, render: bool) -> MediaResult<()>;

    /// Install the notification handler. Callback-mode sessions need a
    /// handler in place before `start`.
    fn set_event_handler(&mut self, handler: Box<dyn SessionEventHandler>) -> MediaResult<()>;
}

/// Factory for driver-level sessions
pub trait CodecBackend: Send + Sync {
    fn create_encoder(&self, mime: &str) -> MediaResult<Box<dyn CodecSession>>;
}
