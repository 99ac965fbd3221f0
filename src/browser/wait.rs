//! Polling wait primitive.
//!
//! A predicate is evaluated against a session until it reports success, the
//! timeout elapses, or it fails with a non-transient error. The predicate
//! always runs at least once, so a zero timeout still gives it one chance.

use super::{BrowserError, Session};
use std::thread;
use std::time::{Duration, Instant};

/// Delay between two evaluations of a predicate.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of one evaluation.
#[derive(Debug)]
pub enum Check {
    Ready,
    NotYet,
    Failed(BrowserError),
}

impl From<Result<bool, BrowserError>> for Check {
    fn from(result: Result<bool, BrowserError>) -> Self {
        match result {
            Ok(true) => Self::Ready,
            Ok(false) => Self::NotYet,
            Err(e) if e.is_transient() => Self::NotYet,
            Err(e) => Self::Failed(e),
        }
    }
}

impl From<Result<(), BrowserError>> for Check {
    fn from(result: Result<(), BrowserError>) -> Self {
        Self::from(result.map(|()| true))
    }
}

/// Wait settings shared by every wait in a test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waiter {
    interval: Duration,
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Waiter {
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Core loop. Sleeps never overshoot the deadline by more than one
    /// evaluation.
    pub fn until<S, F>(
        &self,
        session: &S,
        timeout: Duration,
        mut check: F,
    ) -> Result<(), BrowserError>
    where
        S: Session + ?Sized,
        F: FnMut(&S) -> Check,
    {
        let deadline = Instant::now() + timeout;
        loop {
            match check(session) {
                Check::Ready => return Ok(()),
                Check::Failed(e) => return Err(e),
                Check::NotYet => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(BrowserError::Timeout { timeout });
            }
            thread::sleep(self.interval.min(deadline - now));
        }
    }

    /// Wait until `predicate` returns `true`.
    pub fn wait_for<S, F>(
        &self,
        session: &S,
        timeout: Duration,
        mut predicate: F,
    ) -> Result<(), BrowserError>
    where
        S: Session + ?Sized,
        F: FnMut(&S) -> Result<bool, BrowserError>,
    {
        self.until(session, timeout, |s| predicate(s).into())
    }

    /// Wait until `action` completes without error.
    ///
    /// Useful for interactions that fail while the target is still missing,
    /// e.g. clicking a button the UI has not rendered yet.
    pub fn wait_for_action<S, F>(
        &self,
        session: &S,
        timeout: Duration,
        mut action: F,
    ) -> Result<(), BrowserError>
    where
        S: Session + ?Sized,
        F: FnMut(&S) -> Result<(), BrowserError>,
    {
        self.until(session, timeout, |s| action(s).into())
    }
}

/// Run `check` every `interval` until it is ready, fails, or `timeout` passes.
pub fn wait_until<S, F>(
    session: &S,
    timeout: Duration,
    interval: Duration,
    check: F,
) -> Result<(), BrowserError>
where
    S: Session + ?Sized,
    F: FnMut(&S) -> Check,
{
    Waiter::new(interval).until(session, timeout, check)
}

/// Wait up to `timeout_secs` seconds for `predicate`, polling at the default
/// interval.
pub fn wait_for<S, F>(session: &S, timeout_secs: u64, predicate: F) -> Result<(), BrowserError>
where
    S: Session + ?Sized,
    F: FnMut(&S) -> Result<bool, BrowserError>,
{
    Waiter::default().wait_for(session, Duration::from_secs(timeout_secs), predicate)
}

/// Wait up to `timeout_secs` seconds for `action` to succeed.
pub fn wait_for_action<S, F>(session: &S, timeout_secs: u64, action: F) -> Result<(), BrowserError>
where
    S: Session + ?Sized,
    F: FnMut(&S) -> Result<(), BrowserError>,
{
    Waiter::default().wait_for_action(session, Duration::from_secs(timeout_secs), action)
}
