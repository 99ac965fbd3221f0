//! Server lifecycle state.
//!
//! `STOPPED` (initial) → `RUNNING` (listener bound) → `STOPPED` (terminal).
//! A stopped server never runs again; build a new instance instead.

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a content server instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Running,
}

// Encodings stored in the atomic. `FRESH` is the initial stopped state, which
// is the only one allowed to move to `RUNNING`.
const FRESH: u8 = 0;
const RUNNING: u8 = 1;
const TERMINATED: u8 = 2;

/// Atomically visible state cell shared by the listener and every handler.
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub const fn new() -> Self {
        Self(AtomicU8::new(FRESH))
    }

    pub fn get(&self) -> ServerState {
        match self.0.load(Ordering::SeqCst) {
            RUNNING => ServerState::Running,
            _ => ServerState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.get() == ServerState::Running
    }

    /// Move from the initial stopped state to running.
    ///
    /// Returns `false` if the instance was already started or terminated.
    pub fn start(&self) -> bool {
        self.0
            .compare_exchange(FRESH, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Enter the terminal stopped state.
    ///
    /// Returns `true` only for the call that performed the transition out of
    /// `RUNNING`.
    pub fn stop(&self) -> bool {
        self.0.swap(TERMINATED, Ordering::SeqCst) == RUNNING
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_stopped() {
        let state = StateCell::new();
        assert_eq!(state.get(), ServerState::Stopped);
        assert!(!state.is_running());
    }

    #[test]
    fn test_start_then_stop() {
        let state = StateCell::new();
        assert!(state.start());
        assert_eq!(state.get(), ServerState::Running);

        assert!(state.stop());
        assert_eq!(state.get(), ServerState::Stopped);
    }

    #[test]
    fn test_stop_is_reported_once() {
        let state = StateCell::new();
        state.start();

        assert!(state.stop());
        assert!(!state.stop());
        assert_eq!(state.get(), ServerState::Stopped);
    }

    #[test]
    fn test_no_restart_after_stop() {
        let state = StateCell::new();
        state.start();
        state.stop();

        assert!(!state.start());
        assert_eq!(state.get(), ServerState::Stopped);
    }

    #[test]
    fn test_stop_before_start_blocks_start() {
        let state = StateCell::new();
        assert!(!state.stop());
        assert!(!state.start());
    }
}
