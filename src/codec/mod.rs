//! Hardware video codec pipeline
//!
//! This module drives a platform video encoder through the worker
//! lifecycle:
//! - Format descriptors and encoder configuration
//! - Black-box session traits implemented by platform backends
//! - VideoEncodeWorker with polling and callback drain engines

pub mod format;
pub mod param;
pub mod session;
pub mod worker;

mod callback;
mod polling;

pub use format::FormatDescriptor;
pub use param::VideoParam;
pub use session::{BufferInfo, CodecBackend, CodecRuntimeError, CodecSession, DequeueEvent};
pub use worker::{DrainMode, ReadOutcome, VideoCallback, VideoEncodeWorker};
