//! Screen recording media pipeline core.
//!
//! Drives platform hardware codecs and audio capture devices through a
//! strict five-phase lifecycle (configure, start, read, stop, release)
//! and wires their output buffers toward consumer callbacks. The
//! hardware itself stays behind black-box traits: codec sessions,
//! capture devices and the virtual-display service are supplied by
//! platform backends.

pub mod audio;
pub mod capture;
pub mod codec;
pub mod error;
pub mod recorder;
pub mod worker;

#[cfg(test)]
pub(crate) mod testutil;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for binaries embedding the pipeline.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screenstudio_media=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
