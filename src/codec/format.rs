//! Codec format descriptors
//!
//! A [`FormatDescriptor`] is the typed key-value bag handed to the
//! hardware session at configure time and surfaced back on
//! output-format-change notifications. The session interprets the keys;
//! the pipeline core only builds and forwards them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIMETYPE_VIDEO_AVC: &str = "video/avc";
pub const MIMETYPE_VIDEO_HEVC: &str = "video/hevc";

pub const KEY_MIME: &str = "mime";
pub const KEY_WIDTH: &str = "width";
pub const KEY_HEIGHT: &str = "height";
pub const KEY_BIT_RATE: &str = "bitrate";
pub const KEY_COLOR_FORMAT: &str = "color-format";
pub const KEY_FRAME_RATE: &str = "frame-rate";
pub const KEY_CAPTURE_RATE: &str = "capture-rate";
pub const KEY_I_FRAME_INTERVAL: &str = "i-frame-interval";

/// A single typed format entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatValue {
    Int(i32),
    Long(i64),
    Str(String),
}

/// Typed key-value format description exchanged with a codec session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    entries: BTreeMap<String, FormatValue>,
}

impl FormatDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a video format with its MIME type and geometry.
    pub fn video(mime: &str, width: u32, height: u32) -> Self {
        let mut format = Self::new();
        format.set_str(KEY_MIME, mime);
        format.set_int(KEY_WIDTH, width as i32);
        format.set_int(KEY_HEIGHT, height as i32);
        format
    }

    pub fn set_int(&mut self, key: &str, value: i32) {
        self.entries.insert(key.to_string(), FormatValue::Int(value));
    }

    pub fn set_long(&mut self, key: &str, value: i64) {
        self.entries.insert(key.to_string(), FormatValue::Long(value));
    }

    pub fn set_str(&mut self, key: &str, value: &str) {
        self.entries
            .insert(key.to_string(), FormatValue::Str(value.to_string()));
    }

    pub fn int(&self, key: &str) -> Option<i32> {
        match self.entries.get(key) {
            Some(FormatValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn long(&self, key: &str) -> Option<i64> {
        match self.entries.get(key) {
            Some(FormatValue::Long(value)) => Some(*value),
            Some(FormatValue::Int(value)) => Some(i64::from(*value)),
            _ => None,
        }
    }

    pub fn str_value(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(FormatValue::Str(value)) => Some(value),
            _ => None,
        }
    }

    pub fn mime(&self) -> Option<&str> {
        self.str_value(KEY_MIME)
    }
}
