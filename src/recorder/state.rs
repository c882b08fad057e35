//! Recording service state
//!
//! Service-level state, configuration and session bookkeeping for the
//! orchestrator.

use crate::audio::param::AudioParam;
use crate::codec::param::VideoParam;
use crate::codec::worker::DrainMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current state of the recording service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    #[default]
    Idle,
    /// Workers running, output flowing
    Recording,
    /// Workers stopped but restartable
    Paused,
}

/// Configuration for starting a recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingConfig {
    /// Name handed to the virtual display
    pub display_name: String,

    /// Video encoder configuration
    pub video: VideoParam,

    /// How encoded video output is drained
    pub drain_mode: DrainMode,

    /// Microphone capture configuration, if audio is recorded
    pub audio: Option<AudioParam>,
}

/// One pause/resume span within a recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: Uuid,

    /// Session index (0, 1, 2, ...)
    pub index: usize,

    pub started_at: DateTime<Utc>,

    pub ended_at: Option<DateTime<Utc>>,

    /// Duration of this span in milliseconds
    pub duration_ms: f64,
}

impl SessionInfo {
    pub(crate) fn begin(index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            index,
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: 0.0,
        }
    }

    pub(crate) fn end(&mut self, duration_ms: f64) {
        self.ended_at = Some(Utc::now());
        self.duration_ms = duration_ms;
    }
}

/// Result of a completed recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSummary {
    /// Total recorded time across all sessions in milliseconds
    pub total_duration_ms: f64,

    /// Number of pause/resume spans
    pub session_count: usize,

    pub sessions: Vec<SessionInfo>,
}
