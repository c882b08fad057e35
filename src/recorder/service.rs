//! Recording service
//!
//! Orchestrates the video encode worker, the virtual display feeding it,
//! and the optional audio recorder. This is the only module that touches
//! the platform collaborator traits together, and it owns the overall
//! start/pause/resume/stop sequencing.

use super::state::{RecordingConfig, RecordingState, RecordingSummary, SessionInfo};
use crate::audio::device::AudioBackend;
use crate::audio::recorder::{AudioCallback, AudioRecorderWorker};
use crate::capture::display::{VirtualDisplay, VirtualDisplaySource};
use crate::codec::session::CodecBackend;
use crate::codec::worker::{DrainMode, ReadOutcome, VideoCallback, VideoEncodeWorker};
use crate::error::{MediaError, MediaResult};
use crate::worker::Worker;
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use tokio::sync::broadcast;

/// Events emitted during recording
#[derive(Debug, Clone)]
pub enum RecordingEvent {
    /// Recording started
    Started,
    /// Recording stopped
    Stopped,
    /// Recording paused
    Paused,
    /// Recording resumed
    Resumed,
    /// Error occurred
    Error(String),
}

/// Composes one video worker, one capture display and (optionally) one
/// audio worker into a recording session.
pub struct RecordingService {
    state: Arc<RwLock<RecordingState>>,
    codec_backend: Arc<dyn CodecBackend>,
    audio_backend: Option<Arc<dyn AudioBackend>>,
    display_source: Arc<dyn VirtualDisplaySource>,
    video: Option<Arc<VideoEncodeWorker>>,
    audio: Option<Arc<AudioRecorderWorker>>,
    display: Option<Box<dyn VirtualDisplay>>,
    drain_thread: Option<JoinHandle<()>>,
    sessions: Vec<SessionInfo>,
    session_started: Option<Instant>,
    event_tx: broadcast::Sender<RecordingEvent>,
}

impl RecordingService {
    pub fn new(
        codec_backend: Arc<dyn CodecBackend>,
        display_source: Arc<dyn VirtualDisplaySource>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(RecordingState::Idle)),
            codec_backend,
            audio_backend: None,
            display_source,
            video: None,
            audio: None,
            display: None,
            drain_thread: None,
            sessions: Vec::new(),
            session_started: None,
            event_tx,
        }
    }

    /// Install an audio backend so configs may request microphone
    /// capture.
    pub fn with_audio(mut self, audio_backend: Arc<dyn AudioBackend>) -> Self {
        self.audio_backend = Some(audio_backend);
        self
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        *self.state.read()
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.event_tx.subscribe()
    }

    /// Recorded time so far in milliseconds, across all sessions.
    pub fn duration_ms(&self) -> f64 {
        let completed: f64 = self.sessions.iter().map(|s| s.duration_ms).sum();
        let current = self
            .session_started
            .map(|t| t.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        completed + current
    }

    /// Start recording
    pub fn start(
        &mut self,
        config: RecordingConfig,
        video_callback: Arc<dyn VideoCallback>,
        audio_callback: Option<Arc<dyn AudioCallback>>,
    ) -> MediaResult<()> {
        if *self.state.read() != RecordingState::Idle {
            return Err(MediaError::AlreadyRecording);
        }
        match self.start_inner(config, video_callback, audio_callback) {
            Ok(()) => {
                let _ = self.event_tx.send(RecordingEvent::Started);
                tracing::info!("recording started");
                Ok(())
            }
            Err(err) => {
                tracing::error!(%err, "failed to start recording");
                let _ = self.event_tx.send(RecordingEvent::Error(err.to_string()));
                Err(err)
            }
        }
    }

    fn start_inner(
        &mut self,
        config: RecordingConfig,
        video_callback: Arc<dyn VideoCallback>,
        audio_callback: Option<Arc<dyn AudioCallback>>,
    ) -> MediaResult<()> {
        tracing::info!(display = %config.display_name, "starting recording");

        let video = Arc::new(VideoEncodeWorker::new(
            self.codec_backend.clone(),
            config.drain_mode,
        ));
        video.set_callback(video_callback);
        video.configure(config.video.clone())?;

        // Configure the audio side before any hardware starts; a failure
        // up to here unwinds by dropping the locals.
        let audio = match config.audio {
            Some(audio_param) => {
                let backend = self.audio_backend.clone().ok_or_else(|| {
                    MediaError::AudioDevice("no audio backend installed".into())
                })?;
                let recorder = Arc::new(AudioRecorderWorker::new(backend));
                if let Some(callback) = audio_callback {
                    recorder.set_callback(callback);
                }
                recorder.configure(audio_param)?;
                Some(recorder)
            }
            None => None,
        };

        // The surface is requested while configured and handed straight
        // to the display service; the core never draws into it.
        let surface = video.input_surface()?;
        let mut display = self.display_source.create_display(
            &config.display_name,
            config.video.width,
            config.video.height,
            surface,
        )?;

        // From here every failure must also unwind the display.
        if let Err(err) = self.activate(&video, audio.as_ref(), config.drain_mode) {
            let _ = video.release();
            self.join_drain_thread();
            if let Some(recorder) = &audio {
                let _ = recorder.release();
            }
            display.release();
            return Err(err);
        }

        self.video = Some(video);
        self.audio = audio;
        self.display = Some(display);
        self.sessions.clear();
        self.sessions.push(SessionInfo::begin(0));
        self.session_started = Some(Instant::now());
        *self.state.write() = RecordingState::Recording;
        Ok(())
    }

    /// Stop recording and release every resource
    pub fn stop(&mut self) -> MediaResult<RecordingSummary> {
        if *self.state.read() == RecordingState::Idle {
            return Err(MediaError::NotRecording);
        }
        tracing::info!("stopping recording");
        self.end_current_session();

        if let Some(video) = &self.video {
            video.stop()?;
        }
        self.join_drain_thread();
        if let Some(audio) = &self.audio {
            audio.stop()?;
        }
        if let Some(video) = self.video.take() {
            video.release()?;
        }
        if let Some(audio) = self.audio.take() {
            audio.release()?;
        }
        if let Some(mut display) = self.display.take() {
            display.release();
        }

        let summary = RecordingSummary {
            total_duration_ms: self.sessions.iter().map(|s| s.duration_ms).sum(),
            session_count: self.sessions.len(),
            sessions: std::mem::take(&mut self.sessions),
        };
        *self.state.write() = RecordingState::Idle;
        let _ = self.event_tx.send(RecordingEvent::Stopped);
        tracing::info!(
            duration_ms = summary.total_duration_ms,
            "recording stopped"
        );
        Ok(summary)
    }

    /// Pause recording; workers stop but stay restartable
    pub fn pause(&mut self) -> MediaResult<()> {
        if *self.state.read() != RecordingState::Recording {
            return Err(MediaError::NotRecording);
        }
        tracing::info!("pausing recording");
        self.end_current_session();

        if let Some(video) = &self.video {
            video.stop()?;
        }
        self.join_drain_thread();
        if let Some(audio) = &self.audio {
            audio.stop()?;
        }

        *self.state.write() = RecordingState::Paused;
        let _ = self.event_tx.send(RecordingEvent::Paused);
        Ok(())
    }

    /// Resume a paused recording; workers restart from their stored
    /// params
    pub fn resume(&mut self) -> MediaResult<()> {
        if *self.state.read() != RecordingState::Paused {
            return Err(MediaError::NotRecording);
        }
        tracing::info!("resuming recording");

        if let Some(video) = &self.video {
            video.start()?;
            if let DrainMode::Polling { .. } = video.drain_mode() {
                self.drain_thread = Some(spawn_drain_loop(video.clone()));
            }
        }
        if let Some(audio) = &self.audio {
            audio.start()?;
        }

        self.sessions.push(SessionInfo::begin(self.sessions.len()));
        self.session_started = Some(Instant::now());
        *self.state.write() = RecordingState::Recording;
        let _ = self.event_tx.send(RecordingEvent::Resumed);
        Ok(())
    }

    /// Start the workers and the polling drain loop, video first.
    fn activate(
        &mut self,
        video: &Arc<VideoEncodeWorker>,
        audio: Option<&Arc<AudioRecorderWorker>>,
        drain_mode: DrainMode,
    ) -> MediaResult<()> {
        video.start()?;
        if let DrainMode::Polling { .. } = drain_mode {
            self.drain_thread = Some(spawn_drain_loop(video.clone()));
        }
        if let Some(recorder) = audio {
            recorder.start()?;
        }
        Ok(())
    }

    fn end_current_session(&mut self) {
        if let (Some(started), Some(session)) =
            (self.session_started.take(), self.sessions.last_mut())
        {
            session.end(started.elapsed().as_secs_f64() * 1000.0);
        }
    }

    fn join_drain_thread(&mut self) {
        if let Some(handle) = self.drain_thread.take() {
            let _ = handle.join();
        }
    }
}

/// Dedicated pull loop for a polling-mode worker. Exits within one poll
/// timeout once the worker leaves running.
fn spawn_drain_loop(worker: Arc<VideoEncodeWorker>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        loop {
            match worker.poll_once() {
                Ok(ReadOutcome::NotRunning) | Ok(ReadOutcome::EndOfStream) => break,
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(%err, "video drain failed");
                    break;
                }
            }
        }
        tracing::debug!("video drain loop exited");
    })
}
