//! Worker lifecycle state machine
//!
//! Every hardware-session worker moves through the same five states:
//! uninitialized → configured → running ⇄ stopped, with released terminal.

use crate::error::{MediaError, MediaResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// No hardware session allocated yet
    Uninitialized,
    /// Session allocated and configured, not producing output
    Configured,
    /// Session producing output
    Running,
    /// Session halted, restartable from its stored configuration
    Stopped,
    /// Session freed; the worker is permanently dead
    Released,
}

impl Default for State {
    fn default() -> Self {
        Self::Uninitialized
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Uninitialized => "uninitialized",
            State::Configured => "configured",
            State::Running => "running",
            State::Stopped => "stopped",
            State::Released => "released",
        };
        f.write_str(name)
    }
}

/// Per-worker lifecycle guard.
///
/// Embedded by value in each worker and consulted at the top of every
/// public operation. `expect` fails loudly on a contract violation; the
/// explicitly idempotent no-op cases are handled by the workers
/// themselves before calling it.
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: State,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> State {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Validate that the current state permits `op`.
    pub fn expect(&self, op: &'static str, allowed: &[State]) -> MediaResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(MediaError::InvalidState {
                op,
                state: self.state,
            })
        }
    }

    pub fn transition(&mut self, next: State) {
        tracing::debug!(from = %self.state, to = %next, "worker state transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_uninitialized() {
        assert_eq!(Lifecycle::new().current(), State::Uninitialized);
    }

    #[test]
    fn test_expect_permits_listed_states() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.transition(State::Configured);
        assert!(lifecycle
            .expect("start", &[State::Configured, State::Stopped])
            .is_ok());
    }

    #[test]
    fn test_expect_rejects_unlisted_states() {
        let lifecycle = Lifecycle::new();
        let err = lifecycle.expect("stop", &[State::Running]).unwrap_err();
        match err {
            MediaError::InvalidState { op, state } => {
                assert_eq!(op, "stop");
                assert_eq!(state, State::Uninitialized);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_transition_updates_current() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.transition(State::Configured);
        lifecycle.transition(State::Running);
        assert!(lifecycle.is_running());
        lifecycle.transition(State::Stopped);
        assert_eq!(lifecycle.current(), State::Stopped);
    }
}
