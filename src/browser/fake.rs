//! In-process backend for exercising waits and the pool without Chrome.

use super::{Backend, BrowserError, Rect, Session, SessionConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The one element the fake page renders.
pub(crate) const READY_SELECTOR: &str = ".AuO";

/// Everything sessions did, shared with the test.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    pub launched: usize,
    pub navigations: Vec<String>,
    pub clicks: Vec<(String, usize)>,
    pub drags: Vec<(String, f64, f64)>,
    pub closes: usize,
    pub quits: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Behavior {
    /// Time after navigation before the ready element exists.
    pub render_delay: Duration,
    /// Never render the ready element.
    pub never_render: bool,
    pub fail_launch: bool,
    pub fail_navigate: bool,
    pub fail_close: bool,
    /// The window is gone before the pool gets to it.
    pub window_closed: bool,
}

pub(crate) struct FakeSession {
    behavior: Behavior,
    ledger: Arc<Mutex<Ledger>>,
    navigated: Mutex<Option<(String, Instant)>>,
    window_open: bool,
    running: bool,
}

impl FakeSession {
    pub fn new(behavior: Behavior) -> Self {
        Self::with_ledger(behavior, Arc::default())
    }

    fn with_ledger(behavior: Behavior, ledger: Arc<Mutex<Ledger>>) -> Self {
        Self {
            window_open: !behavior.window_closed,
            behavior,
            ledger,
            navigated: Mutex::new(None),
            running: true,
        }
    }

    pub fn ledger(&self) -> Arc<Mutex<Ledger>> {
        Arc::clone(&self.ledger)
    }

    fn rendered(&self) -> bool {
        !self.behavior.never_render
            && self
                .navigated
                .lock()
                .as_ref()
                .is_some_and(|(_, at)| at.elapsed() >= self.behavior.render_delay)
    }

    fn live(&self) -> Result<(), BrowserError> {
        if self.window_open && self.running {
            Ok(())
        } else {
            Err(BrowserError::SessionClosed)
        }
    }

    fn element(&self, selector: &str, index: usize) -> Result<(), BrowserError> {
        self.live()?;
        if selector == READY_SELECTOR && index == 0 && self.rendered() {
            Ok(())
        } else {
            Err(BrowserError::no_such_element(selector, index))
        }
    }
}

impl Session for FakeSession {
    fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.live()?;
        if self.behavior.fail_navigate {
            return Err(anyhow::anyhow!("net::ERR_CONNECTION_REFUSED at {url}").into());
        }
        self.ledger.lock().navigations.push(url.to_string());
        *self.navigated.lock() = Some((url.to_string(), Instant::now()));
        Ok(())
    }

    fn current_url(&self) -> Result<String, BrowserError> {
        self.live()?;
        Ok(self
            .navigated
            .lock()
            .as_ref()
            .map_or_else(|| "about:blank".to_string(), |(url, _)| url.clone()))
    }

    fn count(&self, selector: &str) -> Result<usize, BrowserError> {
        Ok(usize::from(self.element(selector, 0).is_ok()))
    }

    fn is_displayed(&self, selector: &str) -> Result<bool, BrowserError> {
        self.element(selector, 0).map(|()| true)
    }

    fn is_enabled(&self, selector: &str) -> Result<bool, BrowserError> {
        self.element(selector, 0).map(|()| true)
    }

    fn text(&self, selector: &str) -> Result<String, BrowserError> {
        self.element(selector, 0).map(|()| "AuO".to_string())
    }

    fn bounds(&self, selector: &str) -> Result<Rect, BrowserError> {
        self.element(selector, 0).map(|()| Rect {
            x: 0.0,
            y: 0.0,
            width: 800.0,
            height: 600.0,
        })
    }

    fn click_nth(&self, selector: &str, index: usize) -> Result<(), BrowserError> {
        self.element(selector, index)?;
        self.ledger.lock().clicks.push((selector.to_string(), index));
        Ok(())
    }

    fn drag_by(&self, selector: &str, dx: f64, dy: f64) -> Result<(), BrowserError> {
        self.element(selector, 0)?;
        self.ledger.lock().drags.push((selector.to_string(), dx, dy));
        Ok(())
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        if !self.window_open {
            return Err(BrowserError::SessionClosed);
        }
        if self.behavior.fail_close {
            return Err(anyhow::anyhow!("window refused to close").into());
        }
        self.window_open = false;
        self.ledger.lock().closes += 1;
        Ok(())
    }

    fn quit(&mut self) -> Result<(), BrowserError> {
        if !self.running {
            return Err(BrowserError::SessionClosed);
        }
        self.running = false;
        self.window_open = false;
        self.ledger.lock().quits += 1;
        Ok(())
    }
}

/// Backend whose sessions all share one ledger.
#[derive(Default)]
pub(crate) struct FakeBackend {
    pub behavior: Behavior,
    pub ledger: Arc<Mutex<Ledger>>,
}

impl FakeBackend {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            ledger: Arc::default(),
        }
    }
}

impl Backend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn create_session(&self, _config: &SessionConfig) -> Result<Box<dyn Session>, BrowserError> {
        if self.behavior.fail_launch {
            return Err(BrowserError::Launch("no browser binary".into()));
        }
        self.ledger.lock().launched += 1;
        Ok(Box::new(FakeSession::with_ledger(
            self.behavior.clone(),
            Arc::clone(&self.ledger),
        )))
    }
}
