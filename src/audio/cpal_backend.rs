//! cpal-backed audio capture device
//!
//! cpal streams are bound to the thread that created them (`cpal::Stream`
//! is not `Send`), so the device spawns an owner thread holding the
//! stream and bridges its push-model callback to the blocking pull-model
//! [`AudioDevice::read`] through channels.

use crate::audio::device::{AudioBackend, AudioDevice, ReadError};
use crate::audio::param::{AudioParam, AudioSource, SampleFormat};
use crate::error::{MediaError, MediaResult};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::collections::VecDeque;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Driver code surfaced when the stream thread is gone.
const READ_ERROR_DEAD_STREAM: i32 = -1;

enum StreamCommand {
    Play,
    Pause,
    Shutdown,
}

/// [`AudioBackend`] on top of the platform's default cpal host
pub struct CpalAudioBackend;

impl CpalAudioBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpalAudioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalAudioBackend {
    fn min_buffer_size(&self, param: &AudioParam) -> MediaResult<usize> {
        // 20ms of samples, the smallest chunk the capture loop hands out
        let bytes_per_second = param.sample_rate_hz
            * param.sample_format.bits_per_sample()
            * param.channel_layout.count()
            / 8;
        Ok((bytes_per_second / 50).max(1) as usize)
    }

    fn open(
        &self,
        param: &AudioParam,
        _buffer_size_in_bytes: usize,
    ) -> MediaResult<Box<dyn AudioDevice>> {
        Ok(Box::new(CpalDevice::open(param)?))
    }
}

/// One cpal input stream behind the [`AudioDevice`] pull contract
pub struct CpalDevice {
    cmd_tx: mpsc::Sender<StreamCommand>,
    data_rx: mpsc::Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
    thread: Option<JoinHandle<()>>,
    read_timeout: Duration,
}

impl CpalDevice {
    fn open(param: &AudioParam) -> MediaResult<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (data_tx, data_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();
        let param = param.clone();
        let thread = std::thread::spawn(move || stream_thread(param, cmd_rx, data_tx, ready_tx));
        // Stream construction failures surface at configure time, not on
        // the first read.
        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err),
            Err(_) => {
                return Err(MediaError::AudioDevice(
                    "audio stream thread died during setup".into(),
                ))
            }
        }
        Ok(Self {
            cmd_tx,
            data_rx,
            pending: VecDeque::new(),
            thread: Some(thread),
            read_timeout: Duration::from_secs(1),
        })
    }

    fn send(&self, command: StreamCommand) -> MediaResult<()> {
        self.cmd_tx
            .send(command)
            .map_err(|_| MediaError::AudioDevice("audio stream thread gone".into()))
    }
}

impl AudioDevice for CpalDevice {
    fn start(&mut self) -> MediaResult<()> {
        self.send(StreamCommand::Play)
    }

    fn stop(&mut self) -> MediaResult<()> {
        self.send(StreamCommand::Pause)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        while self.pending.len() < buf.len() {
            match self.data_rx.recv_timeout(self.read_timeout) {
                Ok(chunk) => self.pending.extend(chunk),
                // Hand out what we have; the worker loop comes back.
                Err(mpsc::RecvTimeoutError::Timeout) => break,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    if self.pending.is_empty() {
                        return Err(ReadError {
                            code: READ_ERROR_DEAD_STREAM,
                        });
                    }
                    break;
                }
            }
        }
        let read = buf.len().min(self.pending.len());
        for (dst, byte) in buf.iter_mut().zip(self.pending.drain(..read)) {
            *dst = byte;
        }
        Ok(read)
    }
}

impl Drop for CpalDevice {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(StreamCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Owns the non-Send stream for its whole life, servicing commands.
fn stream_thread(
    param: AudioParam,
    cmd_rx: mpsc::Receiver<StreamCommand>,
    data_tx: mpsc::Sender<Vec<u8>>,
    ready_tx: mpsc::Sender<MediaResult<()>>,
) {
    let host = cpal::default_host();
    let device = match param.source {
        // cpal exposes a single default input; source flavours beyond
        // that are a per-platform concern.
        AudioSource::Default | AudioSource::Microphone | AudioSource::VoiceCommunication => {
            host.default_input_device()
        }
    };
    let Some(device) = device else {
        let _ = ready_tx.send(Err(MediaError::AudioDevice(
            "no default input device".into(),
        )));
        return;
    };

    let config = cpal::StreamConfig {
        channels: param.channel_layout.count() as u16,
        sample_rate: cpal::SampleRate(param.sample_rate_hz),
        buffer_size: cpal::BufferSize::Default,
    };
    let err_fn = |err| tracing::error!("audio input stream error: {err}");
    let stream = match param.sample_format {
        SampleFormat::Pcm16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let bytes: Vec<u8> = data.iter().flat_map(|s| s.to_le_bytes()).collect();
                let _ = data_tx.send(bytes);
            },
            err_fn,
            None,
        ),
        SampleFormat::Pcm8 => device.build_input_stream(
            &config,
            move |data: &[u8], _: &cpal::InputCallbackInfo| {
                let _ = data_tx.send(data.to_vec());
            },
            err_fn,
            None,
        ),
    };
    let stream = match stream {
        Ok(stream) => stream,
        Err(err) => {
            let _ = ready_tx.send(Err(MediaError::AudioDevice(format!(
                "failed to build input stream: {err}"
            ))));
            return;
        }
    };
    let _ = ready_tx.send(Ok(()));

    loop {
        match cmd_rx.recv() {
            Ok(StreamCommand::Play) => {
                if let Err(err) = stream.play() {
                    tracing::error!("failed to start audio stream: {err}");
                }
            }
            Ok(StreamCommand::Pause) => {
                if let Err(err) = stream.pause() {
                    tracing::warn!("failed to pause audio stream: {err}");
                }
            }
            Ok(StreamCommand::Shutdown) | Err(_) => break,
        }
    }
    // dropping the stream closes the driver handle
}
