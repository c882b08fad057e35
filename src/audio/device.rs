//! Audio capture device contract
//!
//! The device is a black box owned by the platform backend; the worker
//! only starts, stops and pulls PCM bytes out of it.

use crate::audio::param::AudioParam;
use crate::error::MediaResult;
use thiserror::Error;

/// Driver-level read failure, carrying the raw negative status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("audio device read failed with code {code}")]
pub struct ReadError {
    pub code: i32,
}

/// Opaque driver-level capture instance.
///
/// Dropping the box releases the underlying device handle.
pub trait AudioDevice: Send {
    fn start(&mut self) -> MediaResult<()>;

    fn stop(&mut self) -> MediaResult<()>;

    /// Blocking read of up to `buf.len()` bytes of captured PCM.
    ///
    /// A failed read reports the driver code and leaves the device
    /// usable; the stream is not torn down for a single error.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError>;
}

/// Factory for driver-level capture devices
pub trait AudioBackend: Send + Sync {
    /// Minimum capture buffer size for this configuration, in bytes.
    fn min_buffer_size(&self, param: &AudioParam) -> MediaResult<usize>;

    fn open(
        &self,
        param: &AudioParam,
        buffer_size_in_bytes: usize,
    ) -> MediaResult<Box<dyn AudioDevice>>;
}
