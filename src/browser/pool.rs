//! Registry of every live browser session.
//!
//! Sessions are registered before anything else happens to them, so even a
//! session whose first navigation fails is closed by [`DriverPool::close_all`].

use super::{Backend, BrowserError, CleanupError, Session, SessionConfig, SessionId, Waiter};
use crate::{debug, log};
use std::time::Duration;

/// Owns the backend and the active set of sessions.
///
/// Dropping the pool closes whatever is still open.
pub struct DriverPool {
    backend: Box<dyn Backend>,
    config: SessionConfig,
    waiter: Waiter,
    active: Vec<(SessionId, Box<dyn Session>)>,
    next_id: u64,
}

impl DriverPool {
    pub fn new(backend: impl Backend + 'static, config: SessionConfig) -> Self {
        Self {
            backend: Box::new(backend),
            config,
            waiter: Waiter::default(),
            active: Vec::new(),
            next_id: 1,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.waiter = Waiter::new(interval);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn waiter(&self) -> Waiter {
        self.waiter
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Ids of the active sessions, oldest first.
    pub fn ids(&self) -> Vec<SessionId> {
        self.active.iter().map(|(id, _)| *id).collect()
    }

    /// Launch a session and register it.
    pub fn create_session(&mut self) -> Result<SessionId, BrowserError> {
        let session = self.backend.create_session(&self.config)?;
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.active.push((id, session));
        log!("browser"; "{id} started ({})", self.backend.name());
        Ok(id)
    }

    pub fn session(&self, id: SessionId) -> Result<&dyn Session, BrowserError> {
        self.active
            .iter()
            .find(|(active, _)| *active == id)
            .map(|(_, session)| session.as_ref())
            .ok_or(BrowserError::UnknownSession(id))
    }

    /// Create a session, load `url`, and wait until `ready_selector` is visible.
    ///
    /// The session stays registered when navigation or the wait fails.
    pub fn open(
        &mut self,
        url: &str,
        ready_selector: &str,
        timeout: Duration,
    ) -> Result<&dyn Session, BrowserError> {
        let id = self.create_session()?;
        let waiter = self.waiter;
        let session = self.session(id)?;
        navigate_and_wait_visible(session, url, ready_selector, timeout, waiter)?;
        Ok(session)
    }

    /// Close and unregister one session.
    pub fn close(&mut self, id: SessionId) -> Result<(), BrowserError> {
        let index = self
            .active
            .iter()
            .position(|(active, _)| *active == id)
            .ok_or(BrowserError::UnknownSession(id))?;
        let (id, session) = self.active.remove(index);
        shut_down(id, session)
    }

    /// Close every active session, best effort.
    ///
    /// Each session gets a close and a quit even if an earlier one failed.
    /// Sessions that were already closed count as success. The active set
    /// is empty afterwards either way.
    pub fn close_all(&mut self) -> Result<(), CleanupError> {
        if self.active.is_empty() {
            return Ok(());
        }

        let mut failures = Vec::new();
        for (id, session) in self.active.drain(..) {
            if let Err(e) = shut_down(id, session) {
                log!("error"; "failed to close {id}: {e}");
                failures.push((id, e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CleanupError { failures })
        }
    }
}

impl Drop for DriverPool {
    fn drop(&mut self) {
        if let Err(e) = self.close_all() {
            log!("error"; "{e}");
        }
    }
}

/// Load `url` in `session` and wait until `selector` is displayed.
pub fn navigate_and_wait_visible<S: Session + ?Sized>(
    session: &S,
    url: &str,
    selector: &str,
    timeout: Duration,
    waiter: Waiter,
) -> Result<(), BrowserError> {
    session.navigate(url)?;
    waiter.wait_for(session, timeout, |s| s.is_displayed(selector))?;
    debug!("browser"; "{url} ready ({selector})");
    Ok(())
}

fn shut_down(id: SessionId, mut session: Box<dyn Session>) -> Result<(), BrowserError> {
    let closed = already_closed_is_ok(session.close());
    let quit = already_closed_is_ok(session.quit());
    debug!("browser"; "{id} closed");
    closed.and(quit)
}

fn already_closed_is_ok(result: Result<(), BrowserError>) -> Result<(), BrowserError> {
    match result {
        Err(BrowserError::SessionClosed) => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{Behavior, FakeBackend, Ledger, READY_SELECTOR};
    use parking_lot::Mutex;
    use std::sync::Arc;

    const URL: &str = "http://localhost:8080/TEST";

    fn pool(behavior: Behavior) -> (DriverPool, Arc<Mutex<Ledger>>) {
        let backend = FakeBackend::new(behavior);
        let ledger = Arc::clone(&backend.ledger);
        let pool = DriverPool::new(backend, SessionConfig::default())
            .with_poll_interval(Duration::from_millis(5));
        (pool, ledger)
    }

    #[test]
    fn test_close_all_empty() {
        let (mut pool, ledger) = pool(Behavior::default());
        assert!(pool.close_all().is_ok());
        assert!(pool.close_all().is_ok());
        assert_eq!(ledger.lock().quits, 0);
    }

    #[test]
    fn test_close_all_single() {
        let (mut pool, ledger) = pool(Behavior::default());
        pool.create_session().unwrap();

        pool.close_all().unwrap();
        assert!(pool.is_empty());
        let ledger = ledger.lock();
        assert_eq!((ledger.closes, ledger.quits), (1, 1));
    }

    #[test]
    fn test_close_all_many() {
        let (mut pool, ledger) = pool(Behavior::default());
        for _ in 0..3 {
            pool.create_session().unwrap();
        }
        assert_eq!(pool.len(), 3);

        pool.close_all().unwrap();
        assert!(pool.is_empty());
        let ledger = ledger.lock();
        assert_eq!((ledger.launched, ledger.closes, ledger.quits), (3, 3, 3));
    }

    #[test]
    fn test_close_all_tolerates_closed_windows() {
        let (mut pool, ledger) = pool(Behavior {
            window_closed: true,
            ..Behavior::default()
        });
        pool.create_session().unwrap();
        pool.create_session().unwrap();

        pool.close_all().unwrap();
        let ledger = ledger.lock();
        assert_eq!((ledger.closes, ledger.quits), (0, 2));
    }

    #[test]
    fn test_close_all_continues_past_failures() {
        let (mut pool, ledger) = pool(Behavior {
            fail_close: true,
            ..Behavior::default()
        });
        let ids: Vec<_> = (0..3).map(|_| pool.create_session().unwrap()).collect();

        let err = pool.close_all().unwrap_err();
        assert_eq!(err.failures.len(), 3);
        assert_eq!(
            err.failures.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            ids
        );
        assert!(pool.is_empty());
        // Every browser process still ends.
        assert_eq!(ledger.lock().quits, 3);
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let (mut pool, _) = pool(Behavior::default());
        let a = pool.create_session().unwrap();
        let b = pool.create_session().unwrap();
        pool.close(a).unwrap();
        let c = pool.create_session().unwrap();

        assert!(a < b && b < c);
        assert_eq!(pool.ids(), vec![b, c]);
    }

    #[test]
    fn test_close_one() {
        let (mut pool, ledger) = pool(Behavior::default());
        let id = pool.create_session().unwrap();

        pool.close(id).unwrap();
        assert!(pool.is_empty());
        assert_eq!(ledger.lock().quits, 1);
        assert!(matches!(
            pool.close(id),
            Err(BrowserError::UnknownSession(unknown)) if unknown == id
        ));
    }

    #[test]
    fn test_open_waits_for_ready_element() {
        let (mut pool, ledger) = pool(Behavior {
            render_delay: Duration::from_millis(30),
            ..Behavior::default()
        });

        let session = pool.open(URL, READY_SELECTOR, Duration::from_secs(2)).unwrap();
        assert_eq!(session.current_url().unwrap(), URL);
        assert!(session.is_displayed(READY_SELECTOR).unwrap());
        assert_eq!(ledger.lock().navigations, vec![URL.to_string()]);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_open_timeout_keeps_session_registered() {
        let (mut pool, ledger) = pool(Behavior {
            never_render: true,
            ..Behavior::default()
        });

        let err = pool
            .open(URL, READY_SELECTOR, Duration::from_millis(20))
            .err()
            .unwrap();
        assert!(err.is_timeout());
        assert_eq!(pool.len(), 1);

        pool.close_all().unwrap();
        assert_eq!(ledger.lock().quits, 1);
    }

    #[test]
    fn test_failed_navigation_is_still_cleaned_up() {
        let (mut pool, ledger) = pool(Behavior {
            fail_navigate: true,
            ..Behavior::default()
        });

        let err = pool.open(URL, READY_SELECTOR, Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, BrowserError::Backend(_)));
        assert_eq!(pool.len(), 1);

        pool.close_all().unwrap();
        assert_eq!(ledger.lock().quits, 1);
    }

    #[test]
    fn test_launch_failure_registers_nothing() {
        let (mut pool, _) = pool(Behavior {
            fail_launch: true,
            ..Behavior::default()
        });

        assert!(matches!(pool.create_session(), Err(BrowserError::Launch(_))));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_drop_closes_sessions() {
        let (mut pool, ledger) = pool(Behavior::default());
        pool.create_session().unwrap();
        pool.create_session().unwrap();

        drop(pool);
        assert_eq!(ledger.lock().quits, 2);
    }
}
