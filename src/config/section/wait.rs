//! `[wait]` section configuration.

use serde::Deserialize;

use crate::browser::DEFAULT_POLL_INTERVAL;

/// Polling settings for the wait primitive.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Delay between predicate evaluations.
    pub poll_interval_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}
