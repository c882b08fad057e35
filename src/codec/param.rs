//! Video encoder configuration

use crate::codec::format::{self, FormatDescriptor};
use crate::error::{MediaError, MediaResult};
use serde::{Deserialize, Serialize};

/// Color format selector telling the session to take input from a
/// writable surface instead of a buffer queue.
pub const COLOR_FORMAT_SURFACE: i32 = 0x7F000789;

/// Frozen video encoder configuration.
///
/// Validated on construction and never mutated afterwards; the worker
/// owns the instance it was configured with for its whole lifetime and
/// re-applies it on restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParam {
    /// MIME-type format tag, e.g. [`format::MIMETYPE_VIDEO_AVC`]
    pub mime: String,
    pub width: u32,
    pub height: u32,
    /// Target bitrate in bits per second
    pub bit_rate: u32,
    /// Input color format, [`COLOR_FORMAT_SURFACE`] for screen capture
    pub color_format: i32,
    pub frame_rate: u32,
    /// Key frame interval in seconds
    pub i_frame_interval: u32,
}

impl VideoParam {
    pub fn new(
        mime: &str,
        width: u32,
        height: u32,
        bit_rate: u32,
        color_format: i32,
        frame_rate: u32,
        i_frame_interval: u32,
    ) -> MediaResult<Self> {
        if mime.is_empty() {
            return Err(MediaError::InvalidParam("empty mime type".into()));
        }
        if width == 0 || height == 0 {
            return Err(MediaError::InvalidParam(format!(
                "invalid geometry {width}x{height}"
            )));
        }
        if bit_rate == 0 {
            return Err(MediaError::InvalidParam("zero bitrate".into()));
        }
        if frame_rate == 0 {
            return Err(MediaError::InvalidParam("zero frame rate".into()));
        }
        Ok(Self {
            mime: mime.to_string(),
            width,
            height,
            bit_rate,
            color_format,
            frame_rate,
            i_frame_interval,
        })
    }

    /// Format descriptor applied to the session at configure time.
    pub fn to_format(&self) -> FormatDescriptor {
        let mut fmt = FormatDescriptor::video(&self.mime, self.width, self.height);
        fmt.set_int(format::KEY_BIT_RATE, self.bit_rate as i32);
        fmt.set_int(format::KEY_COLOR_FORMAT, self.color_format);
        fmt.set_int(format::KEY_FRAME_RATE, self.frame_rate as i32);
        fmt.set_int(format::KEY_CAPTURE_RATE, self.frame_rate as i32);
        fmt.set_int(format::KEY_I_FRAME_INTERVAL, self.i_frame_interval as i32);
        fmt
    }
}
