//! Browser session error types.

use super::SessionId;
use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by sessions, the wait primitive, and the pool.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser")]
    Launch(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("no element #{index} matches `{selector}`")]
    NoSuchElement { selector: String, index: usize },

    #[error("session is already closed")]
    SessionClosed,

    #[error("condition not met within {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("{0} is not registered in the pool")]
    UnknownSession(SessionId),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl BrowserError {
    pub fn no_such_element(selector: &str, index: usize) -> Self {
        Self::NoSuchElement {
            selector: selector.to_string(),
            index,
        }
    }

    /// A missing element is an expected, temporary state while the UI renders.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NoSuchElement { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Sessions that could not be closed during a bulk cleanup.
#[derive(Debug, Error)]
#[error("failed to close {} browser session(s)", failures.len())]
pub struct CleanupError {
    pub failures: Vec<(SessionId, BrowserError)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_missing_elements_are_transient() {
        assert!(BrowserError::no_such_element(".AuO", 0).is_transient());
        assert!(!BrowserError::SessionClosed.is_transient());
        assert!(!BrowserError::Backend(anyhow::anyhow!("socket closed")).is_transient());
        assert!(
            !BrowserError::Timeout {
                timeout: Duration::from_secs(1)
            }
            .is_transient()
        );
    }

    #[test]
    fn test_display() {
        let err = BrowserError::no_such_element(".AuO .auo-save-button", 2);
        assert_eq!(
            err.to_string(),
            "no element #2 matches `.AuO .auo-save-button`"
        );

        let cleanup = CleanupError {
            failures: vec![(SessionId(3), BrowserError::SessionClosed)],
        };
        assert_eq!(cleanup.to_string(), "failed to close 1 browser session(s)");
    }
}
