//! Audio capture configuration

use crate::error::{MediaError, MediaResult};
use serde::{Deserialize, Serialize};

/// Capture input selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSource {
    /// Platform default capture device
    Default,
    Microphone,
    /// Echo-cancelled voice path where the platform offers one
    VoiceCommunication,
}

/// Channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    pub fn count(&self) -> u32 {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }
}

/// PCM sample encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    Pcm8,
    Pcm16,
}

impl SampleFormat {
    pub fn bits_per_sample(&self) -> u32 {
        match self {
            SampleFormat::Pcm8 => 8,
            SampleFormat::Pcm16 => 16,
        }
    }
}

/// Frozen audio capture configuration.
///
/// The capture buffer size is derived from the backend's minimum-buffer
/// query at configure time, never set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioParam {
    pub source: AudioSource,
    pub sample_rate_hz: u32,
    pub channel_layout: ChannelLayout,
    pub sample_format: SampleFormat,
}

impl AudioParam {
    pub fn new(
        source: AudioSource,
        sample_rate_hz: u32,
        channel_layout: ChannelLayout,
        sample_format: SampleFormat,
    ) -> MediaResult<Self> {
        if sample_rate_hz == 0 {
            return Err(MediaError::InvalidParam("zero sample rate".into()));
        }
        Ok(Self {
            source,
            sample_rate_hz,
            channel_layout,
            sample_format,
        })
    }
}
