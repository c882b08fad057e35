//! Worker abstractions
//!
//! This module defines the lifecycle contract shared by every stateful
//! hardware session:
//! - State machine all workers are governed by
//! - Worker trait with the five-phase lifecycle operations

pub mod state;

pub use state::{Lifecycle, State};

use crate::error::MediaResult;

/// Five-phase lifecycle contract for a hardware media session.
///
/// | Op | Required state(s) | Result |
/// |---|---|---|
/// | `configure` | uninitialized | configured |
/// | `start` | configured or stopped (no-op if running) | running |
/// | `stop` | running (no-op if stopped) | stopped |
/// | `release` | any except uninitialized (no-op if released) | released |
///
/// Calling an operation outside its listed states is a contract
/// violation and returns [`MediaError::InvalidState`]. A worker
/// restarted from stopped re-applies its stored configuration; a
/// released worker is permanently dead.
///
/// [`MediaError::InvalidState`]: crate::error::MediaError::InvalidState
pub trait Worker {
    type Param;

    /// Allocate the hardware session and bind the configuration.
    ///
    /// On failure the worker stays uninitialized.
    fn configure(&self, param: Self::Param) -> MediaResult<()>;

    fn start(&self) -> MediaResult<()>;

    fn stop(&self) -> MediaResult<()>;

    /// Free the hardware session. Terminal.
    fn release(&self) -> MediaResult<()>;

    fn state(&self) -> State;
}
