//! Error types and handling
//!
//! Common error types used across the media pipeline.

use crate::worker::State;
use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Lifecycle contract violation: an operation was invoked while the
    /// worker was in a state that does not permit it.
    #[error("{op} is not allowed in state {state}")]
    InvalidState { op: &'static str, state: State },

    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("failed to create hardware session: {0}")]
    SessionCreation(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("{0} is not available in this drain mode")]
    WrongDrainMode(&'static str),

    #[error("audio device error: {0}")]
    AudioDevice(String),

    #[error("audio read failed with driver code {code}")]
    AudioRead { code: i32 },

    #[error("virtual display error: {0}")]
    Display(String),

    #[error("recording already in progress")]
    AlreadyRecording,

    #[error("no recording in progress")]
    NotRecording,
}

/// Result type alias using MediaError
pub type MediaResult<T> = Result<T, MediaError>;
