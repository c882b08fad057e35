//! Audio capture pipeline
//!
//! This module drives a platform capture device through the worker
//! lifecycle:
//! - Capture configuration and presentation-timestamp derivation
//! - Black-box device traits implemented by platform backends
//! - AudioRecorderWorker with its background pull loop
//! - cpal-backed device implementation

pub mod cpal_backend;
pub mod device;
pub mod param;
pub mod pts;
pub mod recorder;

pub use cpal_backend::CpalAudioBackend;
pub use device::{AudioBackend, AudioDevice, ReadError};
pub use param::{AudioParam, AudioSource, ChannelLayout, SampleFormat};
pub use pts::PtsClock;
pub use recorder::{AudioCallback, AudioRecorderWorker};
