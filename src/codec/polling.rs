//! Polling drain engine
//!
//! One bounded step of the caller-driven pull loop: dequeue, classify,
//! deliver, return the slot. Format changes are surfaced to the consumer
//! and polling continues within the same step.

use crate::codec::session::{BufferInfo, CodecSession, DequeueEvent};
use crate::codec::worker::{EncoderInner, ReadOutcome, VideoCallback};
use crate::error::{MediaError, MediaResult};
use std::time::Duration;

pub(crate) fn drain_step(
    inner: &mut EncoderInner,
    timeout: Duration,
    callback: Option<&dyn VideoCallback>,
) -> MediaResult<ReadOutcome> {
    let session = inner
        .session
        .as_mut()
        .ok_or_else(|| MediaError::Codec("running worker lost its session".into()))?;
    loop {
        match session.dequeue_output(timeout)? {
            DequeueEvent::TimedOut => return Ok(ReadOutcome::NoData),
            DequeueEvent::FormatChanged(format) => {
                tracing::debug!("encoder output format changed");
                if let Some(cb) = callback {
                    cb.on_output_format_changed(&format);
                }
            }
            DequeueEvent::OutputAvailable { index, info } => {
                return deliver_output(session.as_mut(), index, info, callback);
            }
        }
    }
}

/// Classify one drained unit, deliver any payload, and return the slot
/// to the session. The slot is released on every branch, exactly once.
pub(crate) fn deliver_output(
    session: &mut dyn CodecSession,
    index: usize,
    info: BufferInfo,
    callback: Option<&dyn VideoCallback>,
) -> MediaResult<ReadOutcome> {
    // Config-only units carry codec metadata, not payload.
    let payload_len = if info.is_codec_config() { 0 } else { info.size };
    let delivered = if payload_len > 0 {
        match session.output_buffer(index) {
            Ok(bytes) if !bytes.is_empty() => {
                if let Some(cb) = callback {
                    cb.on_output_available(&bytes);
                }
                Some(bytes.len())
            }
            Ok(_) => None,
            Err(err) => {
                // The slot still has to go back even when the copy
                // failed.
                session.release_output_buffer(index, false)?;
                return Err(err);
            }
        }
    } else {
        None
    };
    session.release_output_buffer(index, false)?;

    if info.is_end_of_stream() {
        tracing::debug!(index, "encoder signalled end of stream");
        return Ok(ReadOutcome::EndOfStream);
    }
    Ok(match delivered {
        Some(bytes) => ReadOutcome::Delivered { bytes },
        None => ReadOutcome::NoData,
    })
}
