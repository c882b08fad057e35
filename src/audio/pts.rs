//! Presentation timestamp derivation
//!
//! Timestamps follow from byte counts: sample rate, bit depth and
//! channel count fix the bytes-per-second rate, and the microsecond
//! offset of any byte position is derived by truncating integer
//! division. The division shape is load-bearing: the denominator is
//! computed first, so accumulated buffers don't drift against each
//! other.

use crate::audio::param::AudioParam;

/// Byte-position to microsecond converter for one capture configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtsClock {
    sample_rate_hz: u32,
    bits_per_sample: u32,
    channels: u32,
    buffer_size_in_bytes: usize,
}

impl PtsClock {
    pub fn new(param: &AudioParam, buffer_size_in_bytes: usize) -> Self {
        Self {
            sample_rate_hz: param.sample_rate_hz,
            bits_per_sample: param.sample_format.bits_per_sample(),
            channels: param.channel_layout.count(),
            buffer_size_in_bytes,
        }
    }

    pub fn buffer_size_in_bytes(&self) -> usize {
        self.buffer_size_in_bytes
    }

    /// Microseconds covered by one capture buffer.
    pub fn per_buffer(&self) -> i64 {
        self.by_count(1)
    }

    /// Microseconds covered by `count` capture buffers.
    pub fn by_count(&self, count: u64) -> i64 {
        self.by_size(self.buffer_size_in_bytes as u64 * count)
    }

    /// Microseconds covered by `bytes` bytes of PCM.
    pub fn by_size(&self, bytes: u64) -> i64 {
        let bytes_per_second = i64::from(self.sample_rate_hz) * i64::from(self.bits_per_sample)
            * i64::from(self.channels)
            / 8;
        bytes as i64 * 1_000_000 / bytes_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::param::{AudioSource, ChannelLayout, SampleFormat};

    fn clock(rate: u32, layout: ChannelLayout, buffer: usize) -> PtsClock {
        let param =
            AudioParam::new(AudioSource::Microphone, rate, layout, SampleFormat::Pcm16).unwrap();
        PtsClock::new(&param, buffer)
    }

    #[test]
    fn test_cd_stereo_reference_case() {
        // 44100 Hz, 16 bit, 2 channels -> 176400 bytes/s;
        // 4096 * 1_000_000 / 176400 truncates to 23219
        let clock = clock(44100, ChannelLayout::Stereo, 4096);
        assert_eq!(clock.by_size(4096), 23219);
        assert_eq!(clock.per_buffer(), 23219);
    }

    #[test]
    fn test_by_size_truncates() {
        let clock = clock(44100, ChannelLayout::Stereo, 4096);
        // 8192 bytes is 46439.9..us; truncation keeps the floor
        assert_eq!(clock.by_size(8192), 46439);
    }

    #[test]
    fn test_by_count_is_linear_for_exact_divisors() {
        // 48000 Hz 16 bit stereo -> 192000 bytes/s; a 1920-byte buffer
        // is exactly 10ms, so counts scale without truncation loss
        let clock = clock(48000, ChannelLayout::Stereo, 1920);
        assert_eq!(clock.by_count(1), 10_000);
        for count in 0..64 {
            assert_eq!(clock.by_count(count), count as i64 * clock.by_count(1));
        }
    }

    #[test]
    fn test_mono_doubles_duration() {
        let stereo = clock(48000, ChannelLayout::Stereo, 1920);
        let mono = clock(48000, ChannelLayout::Mono, 1920);
        assert_eq!(mono.by_size(960), 2 * stereo.by_size(960));
    }

    #[test]
    fn test_zero_bytes_is_zero() {
        let clock = clock(44100, ChannelLayout::Stereo, 4096);
        assert_eq!(clock.by_size(0), 0);
        assert_eq!(clock.by_count(0), 0);
    }
}
