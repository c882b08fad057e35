//! Recording orchestration
//!
//! This module composes the worker pipeline into a recording session:
//! - RecordingService wiring the video worker, virtual display and
//!   optional audio recorder together
//! - Service-level state, config and session bookkeeping

pub mod service;
pub mod state;

pub use service::{RecordingEvent, RecordingService};
pub use state::{RecordingConfig, RecordingState, RecordingSummary, SessionInfo};
